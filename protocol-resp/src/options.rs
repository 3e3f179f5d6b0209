//! Option enums that encode as fixed keyword tokens.

use crate::arg::Argument;
use crate::token::{Token, kw};

macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $token:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $name {
            /// The keyword token this option encodes as.
            #[inline]
            pub const fn token(self) -> Token {
                match self {
                    $($name::$variant => $token),*
                }
            }
        }

        impl From<$name> for Argument<'_> {
            #[inline]
            fn from(value: $name) -> Self {
                Argument::Token(value.token())
            }
        }
    };
}

token_enum! {
    /// Existence condition shared by SET, EXPIRE and ZADD.
    Condition {
        /// Only act if the key/member does not exist.
        Nx => kw::NX,
        /// Only act if the key/member already exists.
        Xx => kw::XX,
    }
}

token_enum! {
    /// Score comparison for ZADD updates.
    Comparison {
        Gt => kw::GT,
        Lt => kw::LT,
    }
}

token_enum! {
    SortOrder {
        Asc => kw::ASC,
        Desc => kw::DESC,
    }
}

token_enum! {
    /// How ZUNIONSTORE/ZINTERSTORE combine scores.
    Aggregate {
        Sum => kw::SUM,
        Min => kw::MIN,
        Max => kw::MAX,
    }
}

token_enum! {
    /// Distance unit for geo commands.
    GeoUnit {
        Meters => kw::M,
        Kilometers => kw::KM,
        Miles => kw::MI,
        Feet => kw::FT,
    }
}

token_enum! {
    BitOp {
        And => kw::AND,
        Or => kw::OR,
        Xor => kw::XOR,
        Not => kw::NOT,
    }
}

token_enum! {
    /// Unit of the BITCOUNT/BITPOS range.
    BitUnit {
        Byte => kw::BYTE,
        Bit => kw::BIT,
    }
}

token_enum! {
    ListSide {
        Left => kw::LEFT,
        Right => kw::RIGHT,
    }
}

token_enum! {
    InsertPosition {
        Before => kw::BEFORE,
        After => kw::AFTER,
    }
}

token_enum! {
    FlushMode {
        Async => kw::ASYNC,
        Sync => kw::SYNC,
    }
}

/// Key expiration attached to SET.
///
/// The timed variants occupy two wire slots (`EX 10`), `KeepTtl` occupies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Seconds from now.
    Ex(u64),
    /// Milliseconds from now.
    Px(u64),
    /// Absolute unix time in seconds.
    ExAt(u64),
    /// Absolute unix time in milliseconds.
    PxAt(u64),
    /// Retain the key's current TTL.
    KeepTtl,
}

impl Expiration {
    /// The keyword token and, for timed variants, its numeric argument.
    pub const fn parts(self) -> (Token, Option<u64>) {
        match self {
            Expiration::Ex(n) => (kw::EX, Some(n)),
            Expiration::Px(n) => (kw::PX, Some(n)),
            Expiration::ExAt(n) => (kw::EXAT, Some(n)),
            Expiration::PxAt(n) => (kw::PXAT, Some(n)),
            Expiration::KeepTtl => (kw::KEEPTTL, None),
        }
    }

    /// Number of wire slots this option contributes.
    pub const fn slots(self) -> usize {
        match self.parts() {
            (_, Some(_)) => 2,
            (_, None) => 1,
        }
    }
}
