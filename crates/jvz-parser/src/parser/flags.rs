//! Node and modifier flags.

use bitflags::bitflags;

bitflags! {
    /// Per-node flags set by the parser.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The parser reported an error while building this node.
        const THIS_NODE_HAS_ERROR = 1 << 0;
        /// The node was synthesized by recovery and covers no source text.
        const MISSING = 1 << 1;
    }
}

bitflags! {
    /// Java declaration modifiers. Bit values follow the JVM access flags
    /// where one exists, so class file flags convert with `from_bits_truncate`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICTFP = 0x0800;
    }
}

impl ModifierFlags {
    /// Modifier for a modifier keyword, if it is one.
    #[must_use]
    pub fn from_keyword(kind: jvz_scanner::SyntaxKind) -> Option<ModifierFlags> {
        use jvz_scanner::SyntaxKind;
        Some(match kind {
            SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
            SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
            SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
            SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
            SyntaxKind::FinalKeyword => ModifierFlags::FINAL,
            SyntaxKind::SynchronizedKeyword => ModifierFlags::SYNCHRONIZED,
            SyntaxKind::VolatileKeyword => ModifierFlags::VOLATILE,
            SyntaxKind::TransientKeyword => ModifierFlags::TRANSIENT,
            SyntaxKind::NativeKeyword => ModifierFlags::NATIVE,
            SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
            SyntaxKind::StrictFpKeyword => ModifierFlags::STRICTFP,
            _ => return None,
        })
    }
}
