use std::sync::OnceLock;

use envelope::crypto::matrix::ALGORITHMS;
use envelope::{Encoding, Envelope, EnvelopeError, EnvelopeOptions, HashAlgorithm, Record};
use proptest::prelude::*;

fn shared() -> &'static Envelope {
    static ENVELOPE: OnceLock<Envelope> = OnceLock::new();
    ENVELOPE.get_or_init(|| {
        Envelope::new(EnvelopeOptions::new("property secret").encoding(Encoding::Base64)).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_string_round_trips(payload in ".*") {
        let sealed = shared().seal(&payload).unwrap();
        let opened: String = shared().open(&sealed).unwrap();
        prop_assert_eq!(opened, payload);
    }

    #[test]
    fn any_number_list_round_trips(payload in prop::collection::vec(any::<i64>(), 0..64)) {
        let sealed = shared().seal(&payload).unwrap();
        let opened: Vec<i64> = shared().open(&sealed).unwrap();
        prop_assert_eq!(opened, payload);
    }

    #[test]
    fn any_ciphertext_bit_flip_is_tampered(payload in "[a-z]{1,40}", bit in 0usize..8) {
        let sealed = shared().seal(&payload).unwrap();
        let mut record = Record::from_json(&sealed).unwrap();
        let mut ciphertext = Encoding::Base64.decode(&record.ciphertext).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 1 << bit;
        record.ciphertext = Encoding::Base64.encode(&ciphertext);

        let opened = shared().open::<String>(&record.to_json().unwrap());
        prop_assert!(matches!(opened, Err(EnvelopeError::Tampered)));
    }
}

#[test]
fn every_algorithm_round_trips() {
    for (name, _) in ALGORITHMS {
        let envelope = Envelope::new(
            EnvelopeOptions::new("matrix secret")
                .algorithm(*name)
                .allow_insecure(true),
        )
        .unwrap();
        let sealed = envelope.seal(&("payload", 7, [1.5, -2.0])).unwrap();
        let opened: (String, i32, [f64; 2]) = envelope.open(&sealed).unwrap();
        assert_eq!(opened, ("payload".to_string(), 7, [1.5, -2.0]), "{name}");
    }
}

#[test]
fn every_hash_and_encoding_round_trips() {
    for hash in HashAlgorithm::all() {
        for encoding in [Encoding::Binary, Encoding::Base64, Encoding::Hex] {
            let envelope = Envelope::new(
                EnvelopeOptions::new("matrix secret")
                    .hashing(hash.name())
                    .encoding(encoding),
            )
            .unwrap();
            let sealed = envelope.seal("hello").unwrap();
            let opened: String = envelope.open(&sealed).unwrap();
            assert_eq!(opened, "hello", "{hash} {encoding:?}");
        }
    }
}
