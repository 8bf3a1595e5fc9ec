#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f32,
    pub weight: FontWeight,
}

impl Font {
    pub const BODY: Font = Font {
        size: 17.0,
        weight: FontWeight::Regular,
    };
    pub const HEADLINE: Font = Font {
        size: 17.0,
        weight: FontWeight::Semibold,
    };
    pub const CAPTION: Font = Font {
        size: 12.0,
        weight: FontWeight::Regular,
    };

    pub const fn system(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
        }
    }

    pub const fn weight(self, weight: FontWeight) -> Self {
        Self {
            size: self.size,
            weight,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::BODY
    }
}
