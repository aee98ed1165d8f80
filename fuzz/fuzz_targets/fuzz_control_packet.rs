#![no_main]

use libfuzzer_sys::fuzz_target;
use openvpn_datapath::core::control::ControlPacket;

fuzz_target!(|data: &[u8]| {
    // Fuzz control packet deserialization - test for panics and overreads;
    // anything that parses must reserialize.
    if let Ok(packet) = ControlPacket::deserialize(data) {
        let _ = packet.serialize();
    }
});
