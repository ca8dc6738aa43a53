/**
 * Asset access control.
 *  - Collaborator traits for the ledger, key
 *    service, content and session stores
 *  - Publish, download, rekey and lease flows
 */
pub mod access;
/**
 * Accounts: a seed, the keys derived from it
 *  and the account number that names them.
 */
pub mod account;
/**
 * Key material and the primitives built on it.
 *  - Seeds (V1 and V2) and key derivation
 *  - Signing and box encryption keys
 *  - Data keys and session data
 */
pub mod crypto;
/**
 * Byte-level encodings: varints, checksummed
 *  base58 and recovery phrases.
 */
pub mod encoding;
/**
 * Livenet / testnet selection.
 */
pub mod network;
/**
 * Signed ledger records: registrations,
 *  issues and transfers.
 */
pub mod record;
/**
 * Signing of authenticated API requests.
 */
pub mod request_auth;
/**
 * In-memory collaborators for tests and demos.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::access::{AccessControl, AccessError, AssetFile};
    pub use crate::account::{Account, AccountError, AccountNumber};
    pub use crate::crypto::{DataKey, SessionData, UsedDataKey};
    pub use crate::encoding::Language;
    pub use crate::network::Network;
    pub use crate::record::Accessibility;
    pub use crate::request_auth::{sign_request, SignedRequest};
}
