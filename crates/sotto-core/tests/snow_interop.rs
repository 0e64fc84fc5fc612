//! Interoperability against the `snow` Noise implementation.
//!
//! `snow` derives its keys with its own HMAC-based HKDF rather than the
//! `hkdf` crate, so a completed handshake here pins the whole pipeline
//! (protocol naming, transcript mixing, key derivation, AEAD framing)
//! against an independently written implementation.

use sotto_core::{CipherSuite, HandshakeConfig, HandshakeState, PatternKind};
use sotto_crypto::PrivateKey;

fn snow_builder(name: &str) -> snow::Builder<'_> {
    snow::Builder::new(name.parse().expect("valid protocol name"))
}

/// Drive our state and a snow state through a two-message handshake,
/// `ours` moving first when `ours_initiates`.
fn run_two_message_handshake(
    ours: &mut HandshakeState,
    theirs: &mut snow::HandshakeState,
    ours_initiates: bool,
) {
    let mut buf = vec![0u8; 65535];
    let mut payload_buf = vec![0u8; 65535];

    if ours_initiates {
        let m1 = ours.write_message(b"handshake payload one").unwrap();
        let plen = theirs.read_message(&m1, &mut payload_buf).unwrap();
        assert_eq!(&payload_buf[..plen], b"handshake payload one");

        let len = theirs.write_message(b"handshake payload two", &mut buf).unwrap();
        assert_eq!(ours.read_message(&buf[..len]).unwrap(), b"handshake payload two");
    } else {
        let len = theirs.write_message(b"handshake payload one", &mut buf).unwrap();
        assert_eq!(ours.read_message(&buf[..len]).unwrap(), b"handshake payload one");

        let m2 = ours.write_message(b"handshake payload two").unwrap();
        let plen = theirs.read_message(&m2, &mut payload_buf).unwrap();
        assert_eq!(&payload_buf[..plen], b"handshake payload two");
    }

    assert!(ours.is_finished());
    assert!(theirs.is_handshake_finished());
}

/// Exchange transport messages in both directions after the handshake.
fn verify_transport(
    ours: &HandshakeState,
    ours_initiated: bool,
    theirs: snow::HandshakeState,
) {
    let (mut send, mut recv) = ours.transport_ciphers().unwrap().into_pair(ours_initiated);
    let mut transport = theirs.into_transport_mode().unwrap();
    let mut buf = vec![0u8; 65535];

    for round in 0..3 {
        let outbound = format!("to snow #{round}");
        let ct = send.encrypt_with_ad(b"", outbound.as_bytes()).unwrap();
        let plen = transport.read_message(&ct, &mut buf).unwrap();
        assert_eq!(&buf[..plen], outbound.as_bytes());

        let inbound = format!("from snow #{round}");
        let len = transport.write_message(inbound.as_bytes(), &mut buf).unwrap();
        assert_eq!(recv.decrypt_with_ad(b"", &buf[..len]).unwrap(), inbound.as_bytes());
    }
}

#[test]
fn nn_initiator_against_snow_responder() {
    let mut alice = HandshakeState::new(
        HandshakeConfig::initiator(
            PatternKind::NN.pattern(),
            CipherSuite::chachapoly_sha256(),
        )
        // A caller-supplied ephemeral goes over the wire like a generated one.
        .with_local_ephemeral(PrivateKey::from_bytes([0x40u8; 32])),
    )
    .unwrap();
    let mut responder = snow_builder("Noise_NN_25519_ChaChaPoly_SHA256")
        .build_responder()
        .unwrap();

    run_two_message_handshake(&mut alice, &mut responder, true);
    verify_transport(&alice, true, responder);
}

#[test]
fn nn_responder_against_snow_initiator() {
    let mut bob = HandshakeState::new(HandshakeConfig::responder(
        PatternKind::NN.pattern(),
        CipherSuite::chachapoly_sha256(),
    ))
    .unwrap();
    let mut initiator = snow_builder("Noise_NN_25519_ChaChaPoly_SHA256")
        .build_initiator()
        .unwrap();

    run_two_message_handshake(&mut bob, &mut initiator, false);
    verify_transport(&bob, false, initiator);
}

#[test]
fn xx_static_discovery_against_snow() {
    let snow_static = PrivateKey::generate();
    let mut alice = HandshakeState::new(
        HandshakeConfig::initiator(
            PatternKind::XX.pattern(),
            CipherSuite::chachapoly_sha256(),
        )
        .with_local_static(PrivateKey::generate()),
    )
    .unwrap();
    let mut responder = snow_builder("Noise_XX_25519_ChaChaPoly_SHA256")
        .local_private_key(&snow_static.to_bytes())
        .unwrap()
        .build_responder()
        .unwrap();

    let mut buf = vec![0u8; 65535];
    let mut payload_buf = vec![0u8; 65535];

    let m1 = alice.write_message(b"").unwrap();
    responder.read_message(&m1, &mut payload_buf).unwrap();
    let len = responder.write_message(b"", &mut buf).unwrap();
    alice.read_message(&buf[..len]).unwrap();
    let m3 = alice.write_message(b"").unwrap();
    responder.read_message(&m3, &mut payload_buf).unwrap();

    assert!(alice.is_finished());
    assert_eq!(
        alice.peer_static_key().unwrap().as_bytes(),
        snow_static.public_key().as_bytes()
    );
    verify_transport(&alice, true, responder);
}

#[test]
fn aesgcm_sha512_suite_against_snow() {
    let mut alice = HandshakeState::new(HandshakeConfig::initiator(
        PatternKind::NN.pattern(),
        CipherSuite::aesgcm_sha512(),
    ))
    .unwrap();
    let mut responder = snow_builder("Noise_NN_25519_AESGCM_SHA512")
        .build_responder()
        .unwrap();

    run_two_message_handshake(&mut alice, &mut responder, true);
    verify_transport(&alice, true, responder);
}

#[test]
fn psk0_against_snow() {
    let psk = [0x5Au8; 32];
    let pattern = PatternKind::NN.pattern().with_psk(0).unwrap();
    let mut alice = HandshakeState::new(
        HandshakeConfig::initiator(pattern, CipherSuite::chachapoly_sha256()).with_psk(psk),
    )
    .unwrap();
    let mut responder = snow_builder("Noise_NNpsk0_25519_ChaChaPoly_SHA256")
        .psk(0, &psk)
        .unwrap()
        .build_responder()
        .unwrap();

    run_two_message_handshake(&mut alice, &mut responder, true);
    verify_transport(&alice, true, responder);
}
