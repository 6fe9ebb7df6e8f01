use bignum::BigInt;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Ledger {
    name: String,
    balance: BigInt,
    history: Vec<BigInt>,
}

#[test]
fn test_json_round_trip() {
    let ledger = Ledger {
        name: "reserve".to_string(),
        balance: "-340282366920938463463374607431768211457".parse().unwrap(),
        history: vec![BigInt::new(), BigInt::from(42u32)],
    };
    let json = serde_json::to_string(&ledger).unwrap();
    assert_eq!(
        json,
        r#"{"name":"reserve","balance":"-340282366920938463463374607431768211457","history":["0","42"]}"#
    );
    let back: Ledger = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ledger);
}

#[test]
fn test_json_accepts_integer_tokens() {
    let v: BigInt = serde_json::from_str("-17").unwrap();
    assert_eq!(v, BigInt::from(-17i64));
    let v: BigInt = serde_json::from_str("18446744073709551615").unwrap();
    assert_eq!(v, BigInt::from(u64::MAX));
}

#[test]
fn test_json_rejects_bad_text() {
    let err = serde_json::from_str::<BigInt>(r#""12x""#).unwrap_err();
    assert!(err.to_string().contains("invalid character 'x' at index 2"));
    assert!(serde_json::from_str::<BigInt>("1.5").is_err());
}
