use bitflags::bitflags;

bitflags! {
    /// Axes along which content fills its parent instead of aligning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Expansion: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL   = 0b10;
        const ALL        = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

bitflags! {
    /// A set of edges; used for edges that ignore the safe area.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EdgeSet: u8 {
        const TOP        = 0b0001;
        const LEADING    = 0b0010;
        const BOTTOM     = 0b0100;
        const TRAILING   = 0b1000;
        const HORIZONTAL = Self::LEADING.bits() | Self::TRAILING.bits();
        const VERTICAL   = Self::TOP.bits() | Self::BOTTOM.bits();
        const ALL        = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}
