/// One-byte discriminants that precede every polymorphic value in the index stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coder {
    Nil,
    Int,
    Uint,
    Int32,
    Uint32,
    Int64,
    Uint64,
    String,
    Msg,
    ArrayMsg,
    Struct,
}

impl Coder {
    /// Construct a discriminant from a single byte. Returns `None` if the byte isn't assigned.
    pub fn from_u8(n: u8) -> Option<Coder> {
        match n {
            0 => Some(Coder::Nil),
            1 => Some(Coder::Int),
            2 => Some(Coder::Uint),
            3 => Some(Coder::Int32),
            4 => Some(Coder::Uint32),
            5 => Some(Coder::Int64),
            6 => Some(Coder::Uint64),
            7 => Some(Coder::String),
            8 => Some(Coder::Msg),
            9 => Some(Coder::ArrayMsg),
            10 => Some(Coder::Struct),
            _ => None,
        }
    }

    pub fn into_u8(self) -> u8 {
        match self {
            Coder::Nil => 0,
            Coder::Int => 1,
            Coder::Uint => 2,
            Coder::Int32 => 3,
            Coder::Uint32 => 4,
            Coder::Int64 => 5,
            Coder::Uint64 => 6,
            Coder::String => 7,
            Coder::Msg => 8,
            Coder::ArrayMsg => 9,
            Coder::Struct => 10,
        }
    }
}

impl From<Coder> for u8 {
    fn from(val: Coder) -> u8 {
        val.into_u8()
    }
}
