//! Handshake state machine
//!
//! [`HandshakeState`] interprets a handshake pattern token by token, driving
//! a [`SymmetricState`] and the party's key material through the message
//! exchange. It enforces the turn order the pattern prescribes, generates
//! ephemeral keys lazily as the first `e` token is written, accepts each
//! remote key exactly once, and rejects any message that would exceed the
//! 65535-byte Noise ceiling.
//!
//! A failed inbound message leaves no trace: the transcript and chaining key
//! roll back to their pre-message checkpoint, remote keys received within
//! the failed message are cleared, and the message index does not advance.
//! The same genuine message can then be processed as if the bad one never
//! arrived.
//!
//! Once the final pattern message is processed, [`HandshakeState::transport_ciphers`]
//! derives the two directional transport states and
//! [`HandshakeState::channel_binding`] exposes the final transcript hash.

use sotto_crypto::{AEAD_TAG_LEN, DH_LEN, PrivateKey, PublicKey, diffie_hellman};
use zeroize::Zeroizing;

use crate::MAX_MESSAGE_LEN;
use crate::cipher_state::CipherState;
use crate::error::Error;
use crate::pattern::{Direction, HandshakePattern, Token};
use crate::suite::CipherSuite;
use crate::symmetric_state::SymmetricState;

/// Pre-shared key length required by the psk modifier.
const PSK_LEN: usize = 32;

/// Everything a [`HandshakeState`] needs at construction.
///
/// Built with [`HandshakeConfig::initiator`] or
/// [`HandshakeConfig::responder`] plus the `with_*` setters; which keys are
/// required depends on the pattern and surfaces as [`Error::MissingKey`]
/// when the pattern first needs an absent one.
pub struct HandshakeConfig {
    initiator: bool,
    pattern: HandshakePattern,
    suite: CipherSuite,
    prologue: Vec<u8>,
    local_static: Option<PrivateKey>,
    local_ephemeral: Option<PrivateKey>,
    remote_static: Option<PublicKey>,
    remote_ephemeral: Option<PublicKey>,
    psk: Option<Zeroizing<Vec<u8>>>,
}

impl HandshakeConfig {
    fn new(initiator: bool, pattern: HandshakePattern, suite: CipherSuite) -> Self {
        Self {
            initiator,
            pattern,
            suite,
            prologue: Vec::new(),
            local_static: None,
            local_ephemeral: None,
            remote_static: None,
            remote_ephemeral: None,
            psk: None,
        }
    }

    /// Configuration for the party that sends the first message.
    pub fn initiator(pattern: HandshakePattern, suite: CipherSuite) -> Self {
        Self::new(true, pattern, suite)
    }

    /// Configuration for the party that receives the first message.
    pub fn responder(pattern: HandshakePattern, suite: CipherSuite) -> Self {
        Self::new(false, pattern, suite)
    }

    /// Prologue data both parties must supply identically; any mismatch
    /// fails the first authenticated message.
    #[must_use]
    pub fn with_prologue(mut self, prologue: impl Into<Vec<u8>>) -> Self {
        self.prologue = prologue.into();
        self
    }

    /// The local static keypair; required by patterns with an `s` token or
    /// pre-message on this side.
    #[must_use]
    pub fn with_local_static(mut self, key: PrivateKey) -> Self {
        self.local_static = Some(key);
        self
    }

    /// A fixed local ephemeral keypair. Normally ephemerals are generated
    /// when the first `e` token is written; fixing one supports test
    /// vectors and deterministic replay.
    #[must_use]
    pub fn with_local_ephemeral(mut self, key: PrivateKey) -> Self {
        self.local_ephemeral = Some(key);
        self
    }

    /// The remote static public key; required by patterns that declare it
    /// as a pre-message (`NK`, `KK`, `IK`, ...).
    #[must_use]
    pub fn with_remote_static(mut self, key: PublicKey) -> Self {
        self.remote_static = Some(key);
        self
    }

    /// A remote ephemeral public key known ahead of the handshake.
    #[must_use]
    pub fn with_remote_ephemeral(mut self, key: PublicKey) -> Self {
        self.remote_ephemeral = Some(key);
        self
    }

    /// The 32-byte pre-shared key for `pskN`-modified patterns.
    #[must_use]
    pub fn with_psk(mut self, psk: impl Into<Vec<u8>>) -> Self {
        self.psk = Some(Zeroizing::new(psk.into()));
        self
    }
}

impl core::fmt::Debug for HandshakeConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandshakeConfig")
            .field("initiator", &self.initiator)
            .field("pattern", &self.pattern.modified_name())
            .field("suite", &self.suite)
            .field("psk", &self.psk.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// The two directional transport cipher states produced by a completed
/// handshake.
#[derive(Debug)]
pub struct TransportCiphers {
    /// Keys messages sent by the handshake initiator.
    pub initiator_to_responder: CipherState,
    /// Keys messages sent by the handshake responder.
    pub responder_to_initiator: CipherState,
}

impl TransportCiphers {
    /// The (send, receive) pair for the given role.
    pub fn into_pair(self, initiator: bool) -> (CipherState, CipherState) {
        if initiator {
            (self.initiator_to_responder, self.responder_to_initiator)
        } else {
            (self.responder_to_initiator, self.initiator_to_responder)
        }
    }
}

/// A handshake in progress.
pub struct HandshakeState {
    symmetric: SymmetricState,
    pattern: HandshakePattern,
    protocol_name: String,
    initiator: bool,
    message_index: usize,
    local_static: Option<PrivateKey>,
    local_ephemeral: Option<PrivateKey>,
    remote_static: Option<PublicKey>,
    remote_ephemeral: Option<PublicKey>,
    psk: Option<Zeroizing<Vec<u8>>>,
}

impl HandshakeState {
    /// Initialize a handshake: derive the protocol name, absorb the
    /// prologue and declared pre-message keys, and validate the PSK
    /// against the pattern.
    ///
    /// # Errors
    ///
    /// - `InvalidPsk` if the pattern carries a `psk` token but no key was
    ///   configured, the key is not 32 bytes, or a key was configured for a
    ///   pattern without a `psk` token.
    /// - `MissingKey` if a declared pre-message key is absent.
    /// - `UnsupportedPreMessage` for pre-message tokens other than `s`/`e`.
    pub fn new(config: HandshakeConfig) -> Result<Self, Error> {
        let HandshakeConfig {
            initiator,
            pattern,
            suite,
            prologue,
            local_static,
            local_ephemeral,
            remote_static,
            remote_ephemeral,
            psk,
        } = config;

        match (&psk, pattern.has_psk()) {
            (None, true) => {
                return Err(Error::InvalidPsk {
                    reason: format!("pattern {} requires a pre-shared key", pattern.modified_name()),
                });
            },
            (Some(psk), true) if psk.len() != PSK_LEN => {
                return Err(Error::InvalidPsk {
                    reason: format!("pre-shared key must be {PSK_LEN} bytes, got {}", psk.len()),
                });
            },
            (Some(_), false) => {
                return Err(Error::InvalidPsk {
                    reason: format!("pattern {} has no psk token", pattern.name()),
                });
            },
            _ => {},
        }

        let protocol_name = format!("Noise_{}_{}", pattern.modified_name(), suite.name());
        let mut symmetric = SymmetricState::new(
            std::sync::Arc::clone(suite.hash()),
            std::sync::Arc::clone(suite.cipher()),
            &protocol_name,
        );
        symmetric.mix_hash(&prologue);

        let mut state = Self {
            symmetric,
            pattern,
            protocol_name,
            initiator,
            message_index: 0,
            local_static,
            local_ephemeral,
            remote_static,
            remote_ephemeral,
            psk,
        };

        state.mix_pre_messages()?;
        Ok(state)
    }

    /// Absorb pre-message public keys in declared order, initiator side
    /// first.
    fn mix_pre_messages(&mut self) -> Result<(), Error> {
        let initiator_pre = self.pattern.initiator_pre_messages().to_vec();
        let responder_pre = self.pattern.responder_pre_messages().to_vec();
        for token in initiator_pre {
            self.mix_pre_message_key(token, self.initiator)?;
        }
        for token in responder_pre {
            self.mix_pre_message_key(token, !self.initiator)?;
        }
        Ok(())
    }

    fn mix_pre_message_key(&mut self, token: Token, ours: bool) -> Result<(), Error> {
        let key_bytes = match (token, ours) {
            (Token::S, true) => {
                let Some(local) = &self.local_static else {
                    return Err(Error::MissingKey { key: "local static", token });
                };
                *local.public_key().as_bytes()
            },
            (Token::S, false) => {
                let Some(remote) = &self.remote_static else {
                    return Err(Error::MissingKey { key: "remote static", token });
                };
                *remote.as_bytes()
            },
            (Token::E, true) => {
                let Some(local) = &self.local_ephemeral else {
                    return Err(Error::MissingKey { key: "local ephemeral", token });
                };
                *local.public_key().as_bytes()
            },
            (Token::E, false) => {
                let Some(remote) = &self.remote_ephemeral else {
                    return Err(Error::MissingKey { key: "remote ephemeral", token });
                };
                *remote.as_bytes()
            },
            _ => return Err(Error::UnsupportedPreMessage { token }),
        };
        self.symmetric.mix_hash(&key_bytes);
        Ok(())
    }

    /// Whether every pattern message has been processed.
    pub fn is_finished(&self) -> bool {
        self.message_index >= self.pattern.messages().len()
    }

    /// Whether it is this party's turn to write.
    pub fn should_write(&self) -> bool {
        let Some(message) = self.pattern.messages().get(self.message_index) else {
            return false;
        };
        match message.direction {
            Direction::ToResponder => self.initiator,
            Direction::ToInitiator => !self.initiator,
        }
    }

    /// Whether it is this party's turn to read.
    pub fn should_read(&self) -> bool {
        !self.is_finished() && !self.should_write()
    }

    /// Index of the next pattern message to process.
    pub fn message_index(&self) -> usize {
        self.message_index
    }

    /// The full protocol name, e.g. `Noise_XXpsk3_25519_ChaChaPoly_SHA256`.
    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    /// The peer's static public key, once received or pre-configured.
    pub fn peer_static_key(&self) -> Option<&PublicKey> {
        self.remote_static.as_ref()
    }

    /// The peer's ephemeral public key, once received.
    pub fn peer_ephemeral_key(&self) -> Option<&PublicKey> {
        self.remote_ephemeral.as_ref()
    }

    /// This party's ephemeral public key, once generated or configured.
    pub fn local_ephemeral_key(&self) -> Option<PublicKey> {
        self.local_ephemeral.as_ref().map(PrivateKey::public_key)
    }

    /// The final transcript hash, identical on both sides; suitable for
    /// channel binding.
    ///
    /// # Errors
    ///
    /// `HandshakeInProgress` before the final pattern message.
    pub fn channel_binding(&self) -> Result<&[u8], Error> {
        if !self.is_finished() {
            return Err(Error::HandshakeInProgress);
        }
        Ok(self.symmetric.transcript_hash())
    }

    /// Derive the directional transport cipher states.
    ///
    /// Callable repeatedly; the derivation is deterministic in the final
    /// chaining key.
    ///
    /// # Errors
    ///
    /// `HandshakeInProgress` before the final pattern message.
    pub fn transport_ciphers(&self) -> Result<TransportCiphers, Error> {
        if !self.is_finished() {
            return Err(Error::HandshakeInProgress);
        }
        let (initiator_to_responder, responder_to_initiator) = self.symmetric.split();
        Ok(TransportCiphers { initiator_to_responder, responder_to_initiator })
    }

    /// Write the next handshake message carrying `payload`.
    ///
    /// # Errors
    ///
    /// - `HandshakeFinished` after the final message.
    /// - `RoleViolation` when it is the peer's turn.
    /// - `MessageTooLong` if keys plus payload exceed 65535 bytes.
    /// - `MissingKey` if the pattern needs a key that was not configured.
    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        if self.is_finished() {
            return Err(Error::HandshakeFinished);
        }
        if !self.should_write() {
            return Err(Error::RoleViolation { operation: "write" });
        }

        let tokens = self.pattern.messages()[self.message_index].tokens.clone();
        let projected = self.projected_length(&tokens, payload.len());
        if projected > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong { len: projected, max: MAX_MESSAGE_LEN });
        }

        let mut message = Vec::with_capacity(projected);
        for token in tokens {
            match token {
                Token::E => {
                    let ephemeral =
                        self.local_ephemeral.get_or_insert_with(PrivateKey::generate);
                    let public = *ephemeral.public_key().as_bytes();
                    self.symmetric.mix_hash(&public);
                    if self.pattern.has_psk() {
                        self.symmetric.mix_key(&public);
                    }
                    message.extend_from_slice(&public);
                },
                Token::S => {
                    let Some(local) = &self.local_static else {
                        return Err(Error::MissingKey { key: "local static", token });
                    };
                    let public = *local.public_key().as_bytes();
                    let sealed = self.symmetric.encrypt_and_hash(&public)?;
                    message.extend_from_slice(&sealed);
                },
                Token::Psk => self.mix_psk()?,
                _ => self.mix_dh(token)?,
            }
        }

        let sealed_payload = self.symmetric.encrypt_and_hash(payload)?;
        message.extend_from_slice(&sealed_payload);
        self.message_index += 1;
        Ok(message)
    }

    /// Read the next handshake message, returning its payload.
    ///
    /// On any failure the transcript, chaining key, remote keys, and
    /// message index are exactly as they were before the call.
    ///
    /// # Errors
    ///
    /// - `HandshakeFinished` after the final message.
    /// - `RoleViolation` when it is this party's turn to write.
    /// - `MessageTooLong` / `MessageTooShort` on malformed framing.
    /// - `DuplicateKey` if a remote key arrives twice.
    /// - `AuthenticationFailure` on any tag mismatch or bad key material.
    pub fn read_message(&mut self, message: &[u8]) -> Result<Vec<u8>, Error> {
        if self.is_finished() {
            return Err(Error::HandshakeFinished);
        }
        if !self.should_read() {
            return Err(Error::RoleViolation { operation: "read" });
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong { len: message.len(), max: MAX_MESSAGE_LEN });
        }

        self.symmetric.checkpoint();
        let had_remote_ephemeral = self.remote_ephemeral.is_some();
        let had_remote_static = self.remote_static.is_some();

        match self.read_tokens(message) {
            Ok(payload) => {
                self.message_index += 1;
                Ok(payload)
            },
            Err(err) => {
                self.symmetric.rollback();
                if !had_remote_ephemeral {
                    self.remote_ephemeral = None;
                }
                if !had_remote_static {
                    self.remote_static = None;
                }
                Err(err)
            },
        }
    }

    fn read_tokens(&mut self, message: &[u8]) -> Result<Vec<u8>, Error> {
        let tokens = self.pattern.messages()[self.message_index].tokens.clone();
        let mut remaining = message;

        for token in tokens {
            match token {
                Token::E => {
                    let bytes = take(&mut remaining, DH_LEN)?;
                    if self.remote_ephemeral.is_some() {
                        return Err(Error::DuplicateKey { key: "ephemeral" });
                    }
                    let key = PublicKey::from_slice(bytes)?;
                    self.symmetric.mix_hash(bytes);
                    if self.pattern.has_psk() {
                        self.symmetric.mix_key(bytes);
                    }
                    self.remote_ephemeral = Some(key);
                },
                Token::S => {
                    let len = if self.symmetric.has_key() { DH_LEN + AEAD_TAG_LEN } else { DH_LEN };
                    let bytes = take(&mut remaining, len)?;
                    if self.remote_static.is_some() {
                        return Err(Error::DuplicateKey { key: "static" });
                    }
                    let opened = self.symmetric.decrypt_and_hash(bytes)?;
                    self.remote_static = Some(PublicKey::from_slice(&opened)?);
                },
                Token::Psk => self.mix_psk()?,
                _ => self.mix_dh(token)?,
            }
        }

        self.symmetric.decrypt_and_hash(remaining)
    }

    /// Perform the DH a token names and fold the secret into the chaining
    /// key. `es` and `se` are written from the initiator's viewpoint, so
    /// each party maps them to its own key pair accordingly.
    fn mix_dh(&mut self, token: Token) -> Result<(), Error> {
        let (use_local_static, use_remote_static) = match token {
            Token::Ee => (false, false),
            Token::Es => (!self.initiator, self.initiator),
            Token::Se => (self.initiator, !self.initiator),
            Token::Ss => (true, true),
            _ => {
                return Err(Error::InvalidPattern {
                    reason: format!("token {token} is not a DH token"),
                });
            },
        };

        let local = if use_local_static {
            self.local_static
                .as_ref()
                .ok_or(Error::MissingKey { key: "local static", token })?
        } else {
            self.local_ephemeral
                .as_ref()
                .ok_or(Error::MissingKey { key: "local ephemeral", token })?
        };
        let remote = if use_remote_static {
            self.remote_static
                .as_ref()
                .ok_or(Error::MissingKey { key: "remote static", token })?
        } else {
            self.remote_ephemeral
                .as_ref()
                .ok_or(Error::MissingKey { key: "remote ephemeral", token })?
        };

        let shared = diffie_hellman(local, remote)?;
        self.symmetric.mix_key(shared.as_bytes());
        Ok(())
    }

    fn mix_psk(&mut self) -> Result<(), Error> {
        let Some(psk) = &self.psk else {
            return Err(Error::InvalidPsk { reason: "psk token with no key installed".to_string() });
        };
        self.symmetric.mix_key_and_hash(psk);
        Ok(())
    }

    /// Exact on-wire length this message will have, computed without
    /// touching any state.
    fn projected_length(&self, tokens: &[Token], payload_len: usize) -> usize {
        let mut keyed = self.symmetric.has_key();
        let mut len = 0;
        for token in tokens {
            match token {
                Token::E => {
                    len += DH_LEN;
                    if self.pattern.has_psk() {
                        keyed = true;
                    }
                },
                Token::S => {
                    len += DH_LEN + if keyed { AEAD_TAG_LEN } else { 0 };
                },
                _ => keyed = true,
            }
        }
        len + payload_len + if keyed { AEAD_TAG_LEN } else { 0 }
    }
}

impl core::fmt::Debug for HandshakeState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandshakeState")
            .field("protocol", &self.protocol_name)
            .field("initiator", &self.initiator)
            .field("message_index", &self.message_index)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Split `len` bytes off the front of `remaining`.
fn take<'a>(remaining: &mut &'a [u8], len: usize) -> Result<&'a [u8], Error> {
    if remaining.len() < len {
        return Err(Error::MessageTooShort { expected: len, actual: remaining.len() });
    }
    let (head, tail) = remaining.split_at(len);
    *remaining = tail;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use crate::pattern::{MessagePattern, PatternKind};

    use super::*;

    fn nn_pair() -> (HandshakeState, HandshakeState) {
        let suite = CipherSuite::chachapoly_sha256();
        let alice = HandshakeState::new(HandshakeConfig::initiator(
            PatternKind::NN.pattern(),
            suite.clone(),
        ))
        .unwrap();
        let bob =
            HandshakeState::new(HandshakeConfig::responder(PatternKind::NN.pattern(), suite))
                .unwrap();
        (alice, bob)
    }

    #[test]
    fn protocol_name_is_assembled() {
        let (alice, _) = nn_pair();
        assert_eq!(alice.protocol_name(), "Noise_NN_25519_ChaChaPoly_SHA256");
    }

    #[test]
    fn turn_discipline() {
        let (mut alice, mut bob) = nn_pair();
        assert!(alice.should_write());
        assert!(!alice.should_read());
        assert!(bob.should_read());

        assert_eq!(
            bob.write_message(b"").unwrap_err(),
            Error::RoleViolation { operation: "write" }
        );
        assert_eq!(
            alice.read_message(b"").unwrap_err(),
            Error::RoleViolation { operation: "read" }
        );
    }

    #[test]
    fn finished_handshake_rejects_further_messages() {
        let (mut alice, mut bob) = nn_pair();
        let m1 = alice.write_message(b"").unwrap();
        bob.read_message(&m1).unwrap();
        let m2 = bob.write_message(b"").unwrap();
        alice.read_message(&m2).unwrap();

        assert!(alice.is_finished() && bob.is_finished());
        assert_eq!(alice.write_message(b"").unwrap_err(), Error::HandshakeFinished);
        assert_eq!(bob.read_message(b"").unwrap_err(), Error::HandshakeFinished);
    }

    #[test]
    fn accessors_gated_on_completion() {
        let (alice, _) = nn_pair();
        assert_eq!(alice.channel_binding().unwrap_err(), Error::HandshakeInProgress);
        assert!(matches!(
            alice.transport_ciphers().map(|_| ()),
            Err(Error::HandshakeInProgress)
        ));
    }

    #[test]
    fn oversized_payload_rejected_before_any_state_change() {
        let (mut alice, mut bob) = nn_pair();
        let huge = vec![0u8; MAX_MESSAGE_LEN + 1];
        assert!(matches!(
            alice.write_message(&huge),
            Err(Error::MessageTooLong { .. })
        ));

        // The handshake still proceeds normally afterwards.
        let m1 = alice.write_message(b"hello").unwrap();
        assert_eq!(bob.read_message(&m1).unwrap(), b"hello");
    }

    #[test]
    fn truncated_message_rejected_and_recoverable() {
        let (mut alice, mut bob) = nn_pair();
        let m1 = alice.write_message(b"").unwrap();

        assert_eq!(
            bob.read_message(&m1[..10]).unwrap_err(),
            Error::MessageTooShort { expected: 32, actual: 10 }
        );
        assert!(bob.peer_ephemeral_key().is_none());
        assert_eq!(bob.message_index(), 0);

        bob.read_message(&m1).unwrap();
        assert!(bob.peer_ephemeral_key().is_some());
    }

    #[test]
    fn missing_local_static_reported_per_token() {
        let suite = CipherSuite::chachapoly_sha256();
        let mut alice = HandshakeState::new(HandshakeConfig::initiator(
            PatternKind::XN.pattern(),
            suite.clone(),
        ))
        .unwrap();
        let mut bob = HandshakeState::new(
            HandshakeConfig::responder(PatternKind::XN.pattern(), suite)
                .with_local_static(PrivateKey::generate()),
        )
        .unwrap();

        let m1 = alice.write_message(b"").unwrap();
        bob.read_message(&m1).unwrap();
        let m2 = bob.write_message(b"").unwrap();
        alice.read_message(&m2).unwrap();

        // Message 3 needs the initiator's static key.
        assert_eq!(
            alice.write_message(b"").unwrap_err(),
            Error::MissingKey { key: "local static", token: Token::S }
        );
    }

    #[test]
    fn missing_remote_static_pre_message_fails_construction() {
        let err = HandshakeState::new(HandshakeConfig::initiator(
            PatternKind::NK.pattern(),
            CipherSuite::chachapoly_sha256(),
        ))
        .unwrap_err();
        assert_eq!(err, Error::MissingKey { key: "remote static", token: Token::S });
    }

    #[test]
    fn psk_pattern_requires_psk() {
        let pattern = PatternKind::NN.pattern().with_psk(0).unwrap();
        let err = HandshakeState::new(HandshakeConfig::initiator(
            pattern,
            CipherSuite::chachapoly_sha256(),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPsk { .. }));
    }

    #[test]
    fn psk_must_be_32_bytes() {
        let pattern = PatternKind::NN.pattern().with_psk(0).unwrap();
        let err = HandshakeState::new(
            HandshakeConfig::initiator(pattern, CipherSuite::chachapoly_sha256())
                .with_psk(vec![0u8; 16]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPsk { .. }));
    }

    #[test]
    fn psk_without_psk_pattern_rejected() {
        let err = HandshakeState::new(
            HandshakeConfig::initiator(PatternKind::NN.pattern(), CipherSuite::chachapoly_sha256())
                .with_psk(vec![0u8; 32]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPsk { .. }));
    }

    #[test]
    fn dh_pre_message_token_unsupported() {
        let pattern = HandshakePattern::new(
            "EE",
            vec![MessagePattern::to_responder(vec![Token::E])],
            vec![Token::S, Token::Ee],
            vec![],
        )
        .unwrap();
        let err = HandshakeState::new(
            HandshakeConfig::initiator(pattern, CipherSuite::chachapoly_sha256())
                .with_local_static(PrivateKey::generate()),
        )
        .unwrap_err();
        assert_eq!(err, Error::UnsupportedPreMessage { token: Token::Ee });
    }

    #[test]
    fn duplicate_remote_ephemeral_rejected() {
        // A pattern that (incorrectly) sends e twice in one message.
        let pattern = HandshakePattern::new(
            "EEDUP",
            vec![
                MessagePattern::to_responder(vec![Token::E, Token::E]),
                MessagePattern::to_initiator(vec![Token::E, Token::Ee]),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        let suite = CipherSuite::chachapoly_sha256();
        let mut alice =
            HandshakeState::new(HandshakeConfig::initiator(pattern.clone(), suite.clone()))
                .unwrap();
        let mut bob =
            HandshakeState::new(HandshakeConfig::responder(pattern, suite)).unwrap();

        // The writer happily reuses its ephemeral; the reader must refuse
        // the second copy.
        let m1 = alice.write_message(b"").unwrap();
        assert_eq!(
            bob.read_message(&m1).unwrap_err(),
            Error::DuplicateKey { key: "ephemeral" }
        );
        assert!(bob.peer_ephemeral_key().is_none());
    }

    #[test]
    fn fixed_ephemeral_is_used_verbatim() {
        let ephemeral = PrivateKey::generate();
        let expected = *ephemeral.public_key().as_bytes();
        let suite = CipherSuite::chachapoly_sha256();
        let mut alice = HandshakeState::new(
            HandshakeConfig::initiator(PatternKind::NN.pattern(), suite)
                .with_local_ephemeral(ephemeral),
        )
        .unwrap();

        let m1 = alice.write_message(b"").unwrap();
        assert_eq!(&m1[..32], expected.as_slice());
    }

    #[test]
    fn prologue_mismatch_fails_first_authenticated_message() {
        let suite = CipherSuite::chachapoly_sha256();
        let mut alice = HandshakeState::new(
            HandshakeConfig::initiator(PatternKind::NN.pattern(), suite.clone())
                .with_prologue(b"version 1".as_slice()),
        )
        .unwrap();
        let mut bob = HandshakeState::new(
            HandshakeConfig::responder(PatternKind::NN.pattern(), suite)
                .with_prologue(b"version 2".as_slice()),
        )
        .unwrap();

        // Message 1 is unauthenticated under NN; message 2 carries the
        // first tag and must fail.
        let m1 = alice.write_message(b"").unwrap();
        bob.read_message(&m1).unwrap();
        let m2 = bob.write_message(b"").unwrap();
        assert_eq!(alice.read_message(&m2).unwrap_err(), Error::AuthenticationFailure);
    }
}
