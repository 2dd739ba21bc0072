//! Independently togglable grammar features.

use bitflags::bitflags;

bitflags! {
    /// Grammar extension flags, fixed before parsing starts and consulted
    /// at each relevant production.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Extensions: u8 {
        /// `Foo(args)` instantiates `Foo` without the `new` keyword,
        /// when `Foo` denotes a type.
        const NEW_WITHOUT_KEYWORD = 1 << 0;
        /// `new Foo` instantiates with an implicit empty argument list.
        const NEW_WITHOUT_PARENS = 1 << 1;
        /// The `=*` glob match operator.
        const OPERATOR_GLOB = 1 << 2;
        /// The `=~` regex match operator.
        const OPERATOR_REGEX = 1 << 3;
        /// The `instanceof` operator.
        const OPERATOR_INSTANCEOF = 1 << 4;
    }
}

impl Default for Extensions {
    /// Match operators and `instanceof` on; `new` shorthands off.
    fn default() -> Self {
        Extensions::OPERATOR_GLOB | Extensions::OPERATOR_REGEX | Extensions::OPERATOR_INSTANCEOF
    }
}
