#![no_main]
use ccrypto_bignum::BigInt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let radix = 2 + u32::from(selector) % 35;
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    if let Ok(value) = BigInt::from_radix(text, radix) {
        let printed = value.to_radix(radix).unwrap();
        assert_eq!(BigInt::from_radix(&printed, radix).unwrap(), value);
    }
});
