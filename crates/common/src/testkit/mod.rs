/// In-process collaborators for exercising the access flows
///
/// [`TestNetwork`] wires in-memory implementations of every collaborator
/// trait together, so a scenario needs no ledger or storage service.
///
/// # Example
///
/// ```rust,ignore
/// use common::network::Network;
/// use common::testkit::TestNetwork;
///
/// #[tokio::test]
/// async fn test_transfer_moves_access() -> anyhow::Result<()> {
///     let mut net = TestNetwork::new(Network::Testnet);
///     let alice = net.add_party("alice")?;
///     let bob = net.add_party("bob")?;
///
///     let ids = net.issue(&alice, alice.private_file(b"secret"), 1).await?;
///     net.transfer(&ids[0], &alice, &bob).await?;
///
///     let file = net.access().download(bob.account(), &ids[0]).await?;
///     assert_eq!(file.content, b"secret");
///     Ok(())
/// }
/// ```
mod memory;
mod network;
mod party;

pub use memory::{
    MemoryAccountStore, MemoryContentStore, MemoryKeyService, MemoryRegistry, MemorySessionStore,
};
pub use network::{MemoryAccessControl, TestNetwork};
pub use party::TestParty;
