#![no_main]

use libfuzzer_sys::fuzz_target;
use openvpn_datapath::crypto::CryptoBox;
use openvpn_datapath::datapath::{AeadDecrypter, DataPathChannel, DataPathDecrypter};

fuzz_target!(|data: &[u8]| {
    // Fuzz the inbound data path - arbitrary bytes must never panic,
    // overread, or decrypt successfully without a valid tag.
    let cipher_key = [0x42u8; 32];
    let hmac_key = [0x24u8; 32];
    let cb = CryptoBox::new(&cipher_key, &cipher_key, &hmac_key, &hmac_key).unwrap();
    let mut dec = AeadDecrypter::new(cb.decrypter());
    dec.set_peer_id(0x00abcd);

    let mut dest = vec![0u8; data.len().max(1)];
    let _ = dec.decrypt_data_packet(data, &mut dest);
});
