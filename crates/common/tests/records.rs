mod common;

use std::collections::BTreeMap;

use ::common::account::Account;
use ::common::network::Network;
use ::common::record::{
    IssueRecord, NonceGenerator, OfferAction, OfferResponse, RegistrationRecord, TransferRecord,
};
use ::common::request_auth::{sign_request_at, EncryptionKeyRegistration};

use crate::common::{testnet_account, RECIPIENT_SEED, SENDER_SEED};

#[test]
fn test_known_registration_signature() {
    let registrant = testnet_account(SENDER_SEED);
    let metadata = BTreeMap::from([
        ("k1".to_string(), "v1".to_string()),
        ("k2".to_string(), "v2".to_string()),
    ]);

    let mut record = RegistrationRecord::new("name", &metadata).unwrap();
    record.set_fingerprint(b"hello world").unwrap();
    record.sign(&registrant).unwrap();

    assert_eq!(
        record.registrant.as_ref().unwrap().as_str(),
        "e1pFRPqPhY2gpgJTpCiwXDnVeouY9EjHY6STtKwdN6Z4bp4sog"
    );
    assert_eq!(
        record.signature.as_deref().unwrap(),
        "dc9ad2f4948d5f5defaf9043098cd2f3c245b092f0d0c2fc9744fab1835cfb1a\
         d533ee0ff2a72d1cdd7a69f8ba6e95013fc517d5d4a16ca1b0036b1f3055270c"
    );
    record.verify().unwrap();
}

#[test]
fn test_issue_then_offer() {
    let issuer = testnet_account(SENDER_SEED);
    let receiver = testnet_account(RECIPIENT_SEED);

    let mut registration = RegistrationRecord::new("asset", &BTreeMap::new()).unwrap();
    registration.set_fingerprint(b"content").unwrap();
    let asset_id = registration.asset_id();

    let nonces = NonceGenerator::new();
    let mut issues = IssueRecord::batch(&asset_id, 3, false, &nonces);
    assert_eq!(issues[0].nonce, 0);
    assert!(issues[1].nonce > 0);
    assert_ne!(issues[1].nonce, issues[2].nonce);
    for issue in issues.iter_mut() {
        issue.sign(&issuer).unwrap();
        issue.verify().unwrap();
    }

    let link = "a".repeat(64);
    let mut offer = TransferRecord::offer(&link, receiver.account_number());
    offer.sign(&issuer).unwrap();
    let pending = offer.into_countersigned().unwrap();

    let mut response = OfferResponse::new("offer-1", OfferAction::Accept, pending);
    let auth = response.sign(&receiver).unwrap();
    auth.verify("updateOffer", &["offer-1"]).unwrap();
    response.record().verify_countersignature().unwrap();
    assert_eq!(response.countersignature, response.record().countersignature);
}

#[test]
fn test_rejected_offer_is_not_countersigned() {
    let issuer = testnet_account(SENDER_SEED);
    let receiver = testnet_account(RECIPIENT_SEED);
    let mut offer = TransferRecord::offer(&"b".repeat(64), receiver.account_number());
    offer.sign(&issuer).unwrap();

    let mut response =
        OfferResponse::new("offer-2", OfferAction::Reject, offer.into_countersigned().unwrap());
    response.sign(&receiver).unwrap();
    assert!(response.countersignature.is_none());
}

#[test]
fn test_request_signature_headers() {
    let account = Account::new(Network::Livenet).unwrap();
    let request = sign_request_at(&account, "downloadAsset", &["bitmark-1"], 1_500_000_000_000);
    let headers = request.headers();
    assert_eq!(headers[0].1, account.account_number().as_str());
    assert_eq!(headers[1].1, "1500000000000");
    request.verify("downloadAsset", &["bitmark-1"]).unwrap();
    assert!(request.verify("downloadAsset", &["bitmark-2"]).is_err());
}

#[test]
fn test_encryption_key_registration() {
    let account = testnet_account(SENDER_SEED);
    let other = testnet_account(RECIPIENT_SEED);
    let registration = EncryptionKeyRegistration::new(&account);

    let key = registration.verify(&account.account_number()).unwrap();
    assert_eq!(key, account.encr_key().public_key_bytes());
    assert!(registration.verify(&other.account_number()).is_err());
}
