mod common;

use ::common::account::{Account, AccountError, AccountNumber};
use ::common::crypto::{SeedError, SeedVersion, ALG_ED25519};
use ::common::encoding::Language;
use ::common::network::Network;

use crate::common::{
    livenet_account, testnet_account, ALL, OUTLIER_SEED, RECIPIENT_SEED, SENDER_SEED, V1_LIVENET,
    V1_TESTNET, V2_LIVENET, V2_TESTNET,
};

#[test]
fn test_seeds_recover_known_accounts() {
    for vector in ALL {
        let account = Account::from_seed(vector.seed, vector.network).unwrap();
        assert_eq!(account.account_number().as_str(), vector.account_number);
        assert_eq!(account.seed(), vector.seed);
        assert_eq!(account.network(), vector.network);
    }
}

#[test]
fn test_phrases_recover_known_accounts() {
    for vector in ALL {
        let account =
            Account::from_phrase_str(vector.phrase, Language::English, vector.network).unwrap();
        assert_eq!(account.account_number().as_str(), vector.account_number);
        assert_eq!(account.seed(), vector.seed);
        assert_eq!(
            account.recovery_phrase(Language::English).unwrap().join(" "),
            vector.phrase
        );
    }
}

#[test]
fn test_traditional_chinese_phrases() {
    for vector in [V2_TESTNET, V2_LIVENET] {
        let phrase = vector.phrase_zh_tw.unwrap();
        let account = Account::from_seed(vector.seed, vector.network).unwrap();
        assert_eq!(
            account
                .recovery_phrase(Language::TraditionalChinese)
                .unwrap()
                .join(" "),
            phrase
        );

        let recovered =
            Account::from_phrase_str(phrase, Language::TraditionalChinese, vector.network)
                .unwrap();
        assert_eq!(recovered.account_number().as_str(), vector.account_number);
    }
}

#[test]
fn test_versions() {
    assert_eq!(
        Account::from_seed(V1_TESTNET.seed, Network::Testnet)
            .unwrap()
            .version(),
        SeedVersion::V1
    );
    assert_eq!(
        Account::from_seed(V2_TESTNET.seed, Network::Testnet)
            .unwrap()
            .version(),
        SeedVersion::V2
    );
}

#[test]
fn test_v1_seed_on_wrong_network() {
    let err = Account::from_seed(V1_LIVENET.seed, Network::Testnet).unwrap_err();
    assert_eq!(
        err,
        AccountError::NetworkMismatch {
            recovered: Network::Livenet,
            configured: Network::Testnet,
        }
    );
}

#[test]
fn test_fixture_seeds_keep_their_networks() {
    assert_eq!(testnet_account(SENDER_SEED).network(), Network::Testnet);
    assert_eq!(testnet_account(RECIPIENT_SEED).network(), Network::Testnet);
    assert_eq!(livenet_account(OUTLIER_SEED).network(), Network::Livenet);
    assert!(matches!(
        Account::from_seed(OUTLIER_SEED, Network::Testnet),
        Err(AccountError::NetworkMismatch {
            recovered: Network::Livenet,
            configured: Network::Testnet,
        })
    ));
}

#[test]
fn test_corrupted_seed() {
    let mut chars: Vec<char> = V2_TESTNET.seed.chars().collect();
    let last = chars.len() - 1;
    chars[last] = if chars[last] == '9' { '8' } else { '9' };
    let corrupted: String = chars.into_iter().collect();

    let err = Account::from_seed(&corrupted, Network::Testnet).unwrap_err();
    assert!(matches!(
        err,
        AccountError::Seed(SeedError::InvalidChecksum) | AccountError::Seed(SeedError::InvalidSeedLength)
    ));
}

#[test]
fn test_account_number_fields() {
    for vector in ALL {
        let number = AccountNumber::parse(vector.account_number).unwrap();
        assert_eq!(number.network(), vector.network);
        assert_eq!(number.algorithm(), ALG_ED25519);
        assert_eq!(number.to_string(), vector.account_number);

        let account = Account::from_seed(vector.seed, vector.network).unwrap();
        assert_eq!(
            number.public_key(),
            &account.auth_key().public_key_bytes()
        );
    }
}

#[test]
fn test_account_number_verifies_signatures() {
    let account = Account::from_seed(V2_LIVENET.seed, Network::Livenet).unwrap();
    let number = AccountNumber::parse(V2_LIVENET.account_number).unwrap();
    let signature = account.sign(b"message");
    number.verify(b"message", &signature).unwrap();
    assert!(number.verify(b"other message", &signature).is_err());
}

#[test]
fn test_fresh_accounts_round_trip() {
    for network in [Network::Livenet, Network::Testnet] {
        let account = Account::new(network).unwrap();
        assert_eq!(account.version(), SeedVersion::V2);

        let by_seed = Account::from_seed(&account.seed(), network).unwrap();
        assert_eq!(by_seed.account_number(), account.account_number());

        let phrase = account.recovery_phrase(Language::English).unwrap();
        assert_eq!(phrase.len(), 12);
        let by_phrase = Account::from_recovery_phrase(&phrase, Language::English, network).unwrap();
        assert_eq!(by_phrase.account_number(), account.account_number());
    }
}
