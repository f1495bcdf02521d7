use mysql_snapshot_core::protocol::capability;
use mysql_snapshot_core::utils::mysql_password_encrypted::{scramble323, scramble411};

#[test]
fn scramble323_distinguishes_passwords() {
    let a = scramble323(Some("bar123\tbaz"), Some("a"));
    let b = scramble323(Some("bar123\tbaz"), Some("b"));
    assert_ne!(a, b);
}

#[test]
fn scramble411_matches_known_vectors() {
    let bytes1: [u8; 20] = [
        90, 11, 237, 60, 27, 229, 22, 92, 218, 4, 40, 194, 156, 74, 17, 6, 115, 219, 137, 130,
    ];
    let bytes2: [u8; 20] = [
        144, 172, 198, 232, 168, 40, 205, 38, 38, 161, 110, 255, 41, 67, 51, 175, 76, 240, 184, 28,
    ];

    let scramble_empty = scramble411([].as_slice(), [].as_slice());
    assert_eq!(bytes1.as_slice(), scramble_empty.as_ref());

    let seed: [u8; 20] = [
        37, 73, 41, 87, 22, 56, 51, 91, 105, 70, 125, 40, 21, 10, 18, 63, 1, 46, 29, 117,
    ];
    let scramble_root = scramble411("root".as_bytes(), seed.as_slice());
    assert_eq!(bytes2.as_slice(), scramble_root.as_ref());
}

#[test]
fn client_long_password_capability_bit_is_set() {
    assert_eq!(capability::CLIENT_LONG_PASSWORD, 0x0000_0001);
}
