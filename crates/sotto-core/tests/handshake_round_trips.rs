//! Full handshake round trips
//!
//! Drives every fundamental pattern to completion across both ciphers and
//! both hashes, checks the psk-modified variants, and pins the concrete
//! message sizes of the `Noise_NN_25519_ChaChaPoly_SHA256` exchange.

use sotto_core::{
    CipherSuite, HandshakeConfig, HandshakeState, PatternKind,
};
use sotto_crypto::PrivateKey;

fn suites() -> [CipherSuite; 4] {
    [
        CipherSuite::chachapoly_sha256(),
        CipherSuite::chachapoly_sha512(),
        CipherSuite::aesgcm_sha256(),
        CipherSuite::aesgcm_sha512(),
    ]
}

/// Build a configured initiator/responder pair for `kind`, distributing
/// static keys and pre-shared knowledge as the pattern requires.
fn pair(
    kind: PatternKind,
    suite: &CipherSuite,
    psk_placement: Option<usize>,
) -> (HandshakeState, HandshakeState) {
    let alice_static = PrivateKey::generate();
    let bob_static = PrivateKey::generate();

    let pattern = match psk_placement {
        Some(placement) => kind.pattern().with_psk(placement).unwrap(),
        None => kind.pattern(),
    };

    let mut alice = HandshakeConfig::initiator(pattern.clone(), suite.clone())
        .with_local_static(alice_static.clone());
    let mut bob = HandshakeConfig::responder(pattern, suite.clone())
        .with_local_static(bob_static.clone());

    if kind.initiator_static_pre_shared() {
        bob = bob.with_remote_static(alice_static.public_key());
    }
    if kind.responder_static_pre_shared() {
        alice = alice.with_remote_static(bob_static.public_key());
    }
    if psk_placement.is_some() {
        let psk = [0x5Au8; 32];
        alice = alice.with_psk(psk.to_vec());
        bob = bob.with_psk(psk.to_vec());
    }

    (HandshakeState::new(alice).unwrap(), HandshakeState::new(bob).unwrap())
}

/// Run the handshake to completion, asserting every payload arrives intact.
fn run_to_completion(alice: &mut HandshakeState, bob: &mut HandshakeState) {
    let mut index = 0;
    while !alice.is_finished() {
        let payload = format!("handshake payload {index}").into_bytes();
        if alice.should_write() {
            let message = alice.write_message(&payload).unwrap();
            assert_eq!(bob.read_message(&message).unwrap(), payload);
        } else {
            let message = bob.write_message(&payload).unwrap();
            assert_eq!(alice.read_message(&message).unwrap(), payload);
        }
        index += 1;
    }
    assert!(bob.is_finished());
}

/// Completed sessions agree on the channel binding and can exchange
/// transport messages; one-way patterns only carry initiator traffic.
fn verify_transport(alice: &HandshakeState, bob: &HandshakeState, one_way: bool) {
    assert_eq!(alice.channel_binding().unwrap(), bob.channel_binding().unwrap());

    let (mut alice_send, mut alice_recv) =
        alice.transport_ciphers().unwrap().into_pair(true);
    let (mut bob_send, mut bob_recv) = bob.transport_ciphers().unwrap().into_pair(false);

    let ct = alice_send.encrypt_with_ad(b"", b"from initiator").unwrap();
    assert_eq!(bob_recv.decrypt_with_ad(b"", &ct).unwrap(), b"from initiator");

    if !one_way {
        let ct = bob_send.encrypt_with_ad(b"", b"from responder").unwrap();
        assert_eq!(alice_recv.decrypt_with_ad(b"", &ct).unwrap(), b"from responder");
    }
}

#[test]
fn every_pattern_completes_on_every_suite() {
    for suite in suites() {
        for kind in PatternKind::ALL {
            let (mut alice, mut bob) = pair(kind, &suite, None);
            run_to_completion(&mut alice, &mut bob);
            verify_transport(&alice, &bob, PatternKind::ONE_WAY.contains(&kind));
        }
    }
}

#[test]
fn every_psk_placement_completes() {
    let suite = CipherSuite::chachapoly_sha256();
    for kind in PatternKind::ALL {
        let message_count = kind.pattern().messages().len();
        for placement in 0..=message_count {
            let (mut alice, mut bob) = pair(kind, &suite, Some(placement));
            assert_eq!(
                alice.protocol_name(),
                format!("Noise_{}psk{placement}_25519_ChaChaPoly_SHA256", kind.name())
            );
            run_to_completion(&mut alice, &mut bob);
            verify_transport(&alice, &bob, PatternKind::ONE_WAY.contains(&kind));
        }
    }
}

#[test]
fn protocol_names_match_published_form() {
    let cases = [
        (PatternKind::NN, None, CipherSuite::chachapoly_sha256(), "Noise_NN_25519_ChaChaPoly_SHA256"),
        (PatternKind::XX, Some(3), CipherSuite::chachapoly_sha256(), "Noise_XXpsk3_25519_ChaChaPoly_SHA256"),
        (PatternKind::IK, None, CipherSuite::aesgcm_sha512(), "Noise_IK_25519_AESGCM_SHA512"),
        (PatternKind::NN, Some(0), CipherSuite::aesgcm_sha256(), "Noise_NNpsk0_25519_AESGCM_SHA256"),
        (PatternKind::K, None, CipherSuite::chachapoly_sha512(), "Noise_K_25519_ChaChaPoly_SHA512"),
    ];
    for (kind, placement, suite, expected) in cases {
        let (alice, bob) = pair(kind, &suite, placement);
        assert_eq!(alice.protocol_name(), expected);
        assert_eq!(bob.protocol_name(), expected);
    }
}

#[test]
fn nn_message_sizes_are_exact() {
    let (mut alice, mut bob) = pair(PatternKind::NN, &CipherSuite::chachapoly_sha256(), None);

    // Message 1 is one bare ephemeral; no key is established yet, so the
    // empty payload adds nothing.
    let m1 = alice.write_message(b"").unwrap();
    assert_eq!(m1.len(), 32);
    bob.read_message(&m1).unwrap();

    // Message 2 is an ephemeral plus an authenticated empty payload.
    let m2 = bob.write_message(b"").unwrap();
    assert_eq!(m2.len(), 32 + 16);
    alice.read_message(&m2).unwrap();

    verify_transport(&alice, &bob, false);
}

#[test]
fn xx_discovers_peer_statics() {
    let (mut alice, mut bob) = pair(PatternKind::XX, &CipherSuite::chachapoly_sha256(), None);
    assert!(alice.peer_static_key().is_none());
    assert!(bob.peer_static_key().is_none());

    run_to_completion(&mut alice, &mut bob);

    // Each side learned the other's static key during the exchange.
    assert!(alice.peer_static_key().is_some());
    assert!(bob.peer_static_key().is_some());
    assert_ne!(
        alice.peer_static_key().unwrap().as_bytes(),
        bob.peer_static_key().unwrap().as_bytes()
    );
}

#[test]
fn psk_mismatch_fails_handshake() {
    let suite = CipherSuite::chachapoly_sha256();
    let pattern = PatternKind::NN.pattern().with_psk(0).unwrap();
    let mut alice = HandshakeState::new(
        HandshakeConfig::initiator(pattern.clone(), suite.clone()).with_psk(vec![0x11u8; 32]),
    )
    .unwrap();
    let mut bob = HandshakeState::new(
        HandshakeConfig::responder(pattern, suite).with_psk(vec![0x22u8; 32]),
    )
    .unwrap();

    // With psk0 even the first message payload is authenticated.
    let m1 = alice.write_message(b"").unwrap();
    assert!(bob.read_message(&m1).is_err());
}

#[test]
fn suite_mismatch_fails_handshake() {
    let mut alice = HandshakeState::new(HandshakeConfig::initiator(
        PatternKind::NN.pattern(),
        CipherSuite::chachapoly_sha256(),
    ))
    .unwrap();
    let mut bob = HandshakeState::new(HandshakeConfig::responder(
        PatternKind::NN.pattern(),
        CipherSuite::chachapoly_sha512(),
    ))
    .unwrap();

    let m1 = alice.write_message(b"").unwrap();
    bob.read_message(&m1).unwrap();
    let m2 = bob.write_message(b"").unwrap();
    assert!(alice.read_message(&m2).is_err());
}
