//! Handshake pattern catalog
//!
//! A handshake pattern is a named, ordered list of directional token
//! sequences plus optional pre-message declarations. [`PatternKind`] names
//! the fifteen fundamental patterns of the Noise specification (twelve
//! interactive, three one-way); [`HandshakePattern::new`] admits
//! caller-defined patterns of the same shape, and
//! [`HandshakePattern::with_psk`] derives the `pskN`-modified variants.
//!
//! # Invariants
//!
//! - A non-empty pre-message token list must contain the static token `s`:
//!   pre-messages exist only to declare keys both sides already know.
//! - PSK placement 0 prepends `psk` to message 0; placement N >= 1 appends
//!   `psk` to message N-1.

use crate::error::Error;

/// A single Noise handshake token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Ephemeral public key
    E,
    /// Static public key
    S,
    /// DH(ephemeral, ephemeral)
    Ee,
    /// DH(ephemeral, static): initiator ephemeral, responder static
    Es,
    /// DH(static, ephemeral): initiator static, responder ephemeral
    Se,
    /// DH(static, static)
    Ss,
    /// Pre-shared symmetric key
    Psk,
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::E => "e",
            Self::S => "s",
            Self::Ee => "ee",
            Self::Es => "es",
            Self::Se => "se",
            Self::Ss => "ss",
            Self::Psk => "psk",
        };
        f.write_str(name)
    }
}

/// Direction of one handshake message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the initiator (`->` in Noise notation)
    ToResponder,
    /// Sent by the responder (`<-` in Noise notation)
    ToInitiator,
}

/// One message of a handshake pattern: a direction and its token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePattern {
    /// Who sends this message
    pub direction: Direction,
    /// Tokens processed, in order, while writing or reading it
    pub tokens: Vec<Token>,
}

impl MessagePattern {
    /// An initiator-to-responder message (`->`).
    pub fn to_responder(tokens: Vec<Token>) -> Self {
        Self { direction: Direction::ToResponder, tokens }
    }

    /// A responder-to-initiator message (`<-`).
    pub fn to_initiator(tokens: Vec<Token>) -> Self {
        Self { direction: Direction::ToInitiator, tokens }
    }
}

/// A complete handshake pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePattern {
    name: String,
    psk_modifier: String,
    messages: Vec<MessagePattern>,
    initiator_pre_messages: Vec<Token>,
    responder_pre_messages: Vec<Token>,
}

impl HandshakePattern {
    /// Define a pattern from its parts.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if a non-empty pre-message list lacks the static
    /// token `s`.
    pub fn new(
        name: impl Into<String>,
        messages: Vec<MessagePattern>,
        initiator_pre_messages: Vec<Token>,
        responder_pre_messages: Vec<Token>,
    ) -> Result<Self, Error> {
        for (side, pre) in [
            ("initiator", &initiator_pre_messages),
            ("responder", &responder_pre_messages),
        ] {
            if !pre.is_empty() && !pre.contains(&Token::S) {
                return Err(Error::InvalidPattern {
                    reason: format!("{side} pre-messages must include a static key token"),
                });
            }
        }
        Ok(Self::assemble(name, messages, initiator_pre_messages, responder_pre_messages))
    }

    /// Construct without validation; used for the built-in catalog, whose
    /// entries are known-good.
    fn assemble(
        name: impl Into<String>,
        messages: Vec<MessagePattern>,
        initiator_pre_messages: Vec<Token>,
        responder_pre_messages: Vec<Token>,
    ) -> Self {
        Self {
            name: name.into(),
            psk_modifier: String::new(),
            messages,
            initiator_pre_messages,
            responder_pre_messages,
        }
    }

    /// Base pattern name, without any PSK modifier (`"XX"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern name with the PSK modifier suffix (`"XXpsk3"`), as it
    /// appears in the full protocol name.
    pub fn modified_name(&self) -> String {
        format!("{}{}", self.name, self.psk_modifier)
    }

    /// The message patterns, in exchange order.
    pub fn messages(&self) -> &[MessagePattern] {
        &self.messages
    }

    /// Pre-message tokens declared for the initiator.
    pub fn initiator_pre_messages(&self) -> &[Token] {
        &self.initiator_pre_messages
    }

    /// Pre-message tokens declared for the responder.
    pub fn responder_pre_messages(&self) -> &[Token] {
        &self.responder_pre_messages
    }

    /// Whether any message of this pattern carries a `psk` token.
    pub fn has_psk(&self) -> bool {
        self.messages.iter().any(|m| m.tokens.contains(&Token::Psk))
    }

    /// Derive the `pskN`-modified variant of this pattern.
    ///
    /// Placement 0 prepends `psk` to the first message; placement N >= 1
    /// appends `psk` to message N-1.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if the placement does not name a message.
    pub fn with_psk(&self, placement: usize) -> Result<Self, Error> {
        let mut pattern = self.clone();
        let index = placement.saturating_sub(1);
        let Some(message) = pattern.messages.get_mut(index) else {
            return Err(Error::InvalidPattern {
                reason: format!("psk placement {placement} exceeds message count"),
            });
        };

        if placement == 0 {
            message.tokens.insert(0, Token::Psk);
        } else {
            message.tokens.push(Token::Psk);
        }
        pattern.psk_modifier = format!("psk{placement}");
        Ok(pattern)
    }
}

/// The fifteen fundamental handshake patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `-> e` / `<- e, ee`
    NN,
    /// `-> e, es` / `<- e, ee`, responder static known beforehand
    NK,
    /// `-> e` / `<- e, ee, s, es`
    NX,
    /// `-> e` / `<- e, ee` / `-> s, se`
    XN,
    /// `-> e, es` / `<- e, ee` / `-> s, se`, responder static known
    XK,
    /// `-> e` / `<- e, ee, s, es` / `-> s, se`
    XX,
    /// `-> e` / `<- e, ee, se`, initiator static known beforehand
    KN,
    /// `-> e, es, ss` / `<- e, ee, se`, both statics known
    KK,
    /// `-> e` / `<- e, ee, se, s, es`, initiator static known
    KX,
    /// `-> e, s` / `<- e, ee, se`
    IN,
    /// `-> e, es, s, ss` / `<- e, ee, se`, responder static known
    IK,
    /// `-> e, s` / `<- e, ee, se, s, es`
    IX,
    /// One-way `-> e, es`, responder static known
    N,
    /// One-way `-> e, es, ss`, both statics known
    K,
    /// One-way `-> e, es, s, ss`, responder static known
    X,
}

impl PatternKind {
    /// Every fundamental pattern.
    pub const ALL: [Self; 15] = [
        Self::NN,
        Self::NK,
        Self::NX,
        Self::XN,
        Self::XK,
        Self::XX,
        Self::KN,
        Self::KK,
        Self::KX,
        Self::IN,
        Self::IK,
        Self::IX,
        Self::N,
        Self::K,
        Self::X,
    ];

    /// The twelve interactive patterns.
    pub const INTERACTIVE: [Self; 12] = [
        Self::NN,
        Self::NK,
        Self::NX,
        Self::XN,
        Self::XK,
        Self::XX,
        Self::KN,
        Self::KK,
        Self::KX,
        Self::IN,
        Self::IK,
        Self::IX,
    ];

    /// The three one-way patterns.
    pub const ONE_WAY: [Self; 3] = [Self::N, Self::K, Self::X];

    /// Pattern name as it appears in a protocol name.
    pub fn name(self) -> &'static str {
        match self {
            Self::NN => "NN",
            Self::NK => "NK",
            Self::NX => "NX",
            Self::XN => "XN",
            Self::XK => "XK",
            Self::XX => "XX",
            Self::KN => "KN",
            Self::KK => "KK",
            Self::KX => "KX",
            Self::IN => "IN",
            Self::IK => "IK",
            Self::IX => "IX",
            Self::N => "N",
            Self::K => "K",
            Self::X => "X",
        }
    }

    /// Whether the initiator's static key is declared as a pre-message.
    pub fn initiator_static_pre_shared(self) -> bool {
        matches!(self, Self::KN | Self::KK | Self::KX | Self::K)
    }

    /// Whether the responder's static key is declared as a pre-message.
    pub fn responder_static_pre_shared(self) -> bool {
        matches!(
            self,
            Self::NK | Self::XK | Self::KK | Self::IK | Self::N | Self::K | Self::X
        )
    }

    /// Materialize the token sequences for this pattern.
    pub fn pattern(self) -> HandshakePattern {
        use Token::{E, Ee, Es, S, Se, Ss};

        let messages = match self {
            Self::NN => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee]),
            ],
            Self::NK => vec![
                MessagePattern::to_responder(vec![E, Es]),
                MessagePattern::to_initiator(vec![E, Ee]),
            ],
            Self::NX => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee, S, Es]),
            ],
            Self::XN => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee]),
                MessagePattern::to_responder(vec![S, Se]),
            ],
            Self::XK => vec![
                MessagePattern::to_responder(vec![E, Es]),
                MessagePattern::to_initiator(vec![E, Ee]),
                MessagePattern::to_responder(vec![S, Se]),
            ],
            Self::XX => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee, S, Es]),
                MessagePattern::to_responder(vec![S, Se]),
            ],
            Self::KN => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee, Se]),
            ],
            Self::KK => vec![
                MessagePattern::to_responder(vec![E, Es, Ss]),
                MessagePattern::to_initiator(vec![E, Ee, Se]),
            ],
            Self::KX => vec![
                MessagePattern::to_responder(vec![E]),
                MessagePattern::to_initiator(vec![E, Ee, Se, S, Es]),
            ],
            Self::IN => vec![
                MessagePattern::to_responder(vec![E, S]),
                MessagePattern::to_initiator(vec![E, Ee, Se]),
            ],
            Self::IK => vec![
                MessagePattern::to_responder(vec![E, Es, S, Ss]),
                MessagePattern::to_initiator(vec![E, Ee, Se]),
            ],
            Self::IX => vec![
                MessagePattern::to_responder(vec![E, S]),
                MessagePattern::to_initiator(vec![E, Ee, Se, S, Es]),
            ],
            Self::N => vec![MessagePattern::to_responder(vec![E, Es])],
            Self::K => vec![MessagePattern::to_responder(vec![E, Es, Ss])],
            Self::X => vec![MessagePattern::to_responder(vec![E, Es, S, Ss])],
        };

        let initiator_pre = if self.initiator_static_pre_shared() { vec![S] } else { vec![] };
        let responder_pre = if self.responder_static_pre_shared() { vec![S] } else { vec![] };

        HandshakePattern::assemble(self.name(), messages, initiator_pre, responder_pre)
    }
}
