//! Known accounts shared by the integration tests
#![allow(dead_code)]

use ::common::account::Account;
use ::common::network::Network;

pub struct Vector {
    pub network: Network,
    pub seed: &'static str,
    pub account_number: &'static str,
    pub phrase: &'static str,
    pub phrase_zh_tw: Option<&'static str>,
}

pub const V2_TESTNET: Vector = Vector {
    network: Network::Testnet,
    seed: "9J87CAsHdFdoEu6N1unZk3sqhVBkVL8Z8",
    account_number: "eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYVCb",
    phrase: "name gaze apart lamp lift zone believe steak session laptop crowd hill",
    phrase_zh_tw: Some("箱 阻 起 歸 徹 矮 問 栽 瓜 鼓 支 樂"),
};

pub const V2_LIVENET: Vector = Vector {
    network: Network::Livenet,
    seed: "9J87GaPq7FR9Uacdi3FUoWpP6LbEpo1Ax",
    account_number: "aiKFA9dKkNHPys3nSZrLTPusoocPqXSFp5EexsgQ1hbYUrJVne",
    phrase: "surprise mesh walk inject height join sound minor margin over jewel venue",
    phrase_zh_tw: Some("薯 托 劍 景 擔 額 牢 痛 亦 軟 凱 誼"),
};

pub const V1_TESTNET: Vector = Vector {
    network: Network::Testnet,
    seed: "5XEECt18HGBGNET1PpxLhy5CsCLG9jnmM6Q8QGF4U2yGb1DABXZsVeD",
    account_number: "ec6yMcJATX6gjNwvqp8rbc4jNEasoUgbfBBGGyV5NvoJ54NXva",
    phrase: "accident syrup inquiry you clutch liquid fame upset joke glow best school \
             repeat birth library combine access camera organ trial crazy jeans lizard science",
    phrase_zh_tw: None,
};

pub const V1_LIVENET: Vector = Vector {
    network: Network::Livenet,
    seed: "5XEECqWqA47qWg86DR5HJ29HhbVqwigHUAhgiBMqFSBycbiwnbY639s",
    account_number: "bDnC8nCaupb1AQtNjBoLVrGmobdALpBewkyYRG7kk2euMG93Bf",
    phrase: "ability panel leave spike mixture token voice certain today market grief crater \
             cruise smart camera palm wheat rib swamp labor bid rifle piano glass",
    phrase_zh_tw: None,
};

pub const ALL: [Vector; 4] = [V2_TESTNET, V2_LIVENET, V1_TESTNET, V1_LIVENET];

// SENDER and RECIPIENT are testnet V1 seeds, OUTLIER is a livenet V1 seed
pub const SENDER_SEED: &str = "5XEECttxvRBzxzAmuV4oh6T1FcQu4mBg8eWd9wKbf8hweXsfwtJ8sfH";
pub const RECIPIENT_SEED: &str = "5XEECscX3EQvpqMH59Es92uE9KXuuFRQ5pmZsQtyJFiqLEEi7CqSpCo";
pub const OUTLIER_SEED: &str = "5XEECrT2vfQ29k5QtLT11Pyr9bDVnMRiyDEEVSQYiiDW8MhmzVZ9g2i";

pub fn testnet_account(seed: &str) -> Account {
    Account::from_seed(seed, Network::Testnet).unwrap()
}

pub fn livenet_account(seed: &str) -> Account {
    Account::from_seed(seed, Network::Livenet).unwrap()
}
