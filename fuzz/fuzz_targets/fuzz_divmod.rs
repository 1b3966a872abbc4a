#![no_main]
use ccrypto_bignum::BigInt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());
    let (s, t) = rest.split_at(at);
    let mut dividend = BigInt::from_bytes_be(s);
    dividend.set_negative(split & 1 == 1);
    let mut divisor = BigInt::from_bytes_be(t);
    divisor.set_negative(split & 2 == 2);

    match dividend.divmod(&divisor) {
        Ok((q, r)) => {
            assert_eq!(q.mul(&divisor).add(&r), dividend);
            assert_eq!(r.cmp_abs(&divisor), std::cmp::Ordering::Less);
        }
        Err(_) => assert!(divisor.is_zero()),
    }
});
