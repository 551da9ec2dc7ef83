//! Declarative description of a parameter struct's pointer fields.
//!
//! A [`Schema`] lists, for one wire struct, every field that holds a [`Ptr`]
//! and how long its referent is. Fields that are plain scalars or fixed
//! arrays are not described; they travel with the struct bytes.
//!
//! [`Ptr`]: crate::arena::Ptr

use crate::arena::NULL_OFFSET;

/// Pointer layout of one wire struct.
#[derive(Debug)]
pub struct Schema {
    /// Struct name, used in diagnostics
    pub name: &'static str,
    /// Size of the struct in bytes
    pub size: usize,
    /// Pointer-bearing fields, walked in order
    pub fields: &'static [Field],
}

impl Schema {
    /// Schema of a struct without pointer fields.
    pub const fn flat(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            fields: &[],
        }
    }
}

#[derive(Debug)]
pub enum Field {
    /// Pointer field at byte offset `at`.
    Ptr { at: usize, kind: Kind },
    /// Array of `count` structs embedded in the owner at byte offset `at`.
    ///
    /// `capacity` is the declared length of the embedded array.
    Inline {
        at: usize,
        schema: &'static Schema,
        count: Len,
        capacity: usize,
    },
    /// Fields that depend on a discriminant, as in a C union.
    ///
    /// An unmatched tag selects `default`; without one it is an error.
    Switch {
        tag: Tag,
        arms: &'static [Arm],
        default: Option<&'static [Field]>,
    },
}

impl Field {
    pub const fn bytes(at: usize, len: Len) -> Self {
        Self::Ptr {
            at,
            kind: Kind::Bytes(len),
        }
    }

    pub const fn array(at: usize, schema: &'static Schema, count: Len) -> Self {
        Self::Ptr {
            at,
            kind: Kind::Array { schema, count },
        }
    }

    /// A pointer to exactly one `schema` struct.
    pub const fn one(at: usize, schema: &'static Schema) -> Self {
        Self::array(at, schema, Len::Const(1))
    }

    pub const fn inline(at: usize, schema: &'static Schema, count: Len, capacity: usize) -> Self {
        Self::Inline {
            at,
            schema,
            count,
            capacity,
        }
    }
}

#[derive(Debug)]
pub struct Arm {
    pub value: u32,
    pub fields: &'static [Field],
}

/// What a pointer field refers to.
#[derive(Debug)]
pub enum Kind {
    /// Opaque bytes with no pointers of their own.
    Bytes(Len),
    /// `count` consecutive `schema` structs whose pointers are walked too.
    Array { schema: &'static Schema, count: Len },
}

/// Integer width of a length or tag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U8,
    U16,
    U32,
}

/// Length of a referent (bytes for [`Kind::Bytes`], elements otherwise).
#[derive(Debug)]
pub enum Len {
    Const(usize),
    /// Read from the owning struct and multiplied by `unit`.
    Field { at: usize, width: Width, unit: usize },
    /// NUL-terminated string, terminator included.
    CStr,
    /// Computed from the owner and referent frames.
    With(fn(&Frame<'_>, &Frame<'_>) -> Result<usize, WalkError>),
}

impl Len {
    pub const fn u8(at: usize) -> Self {
        Self::Field {
            at,
            width: Width::U8,
            unit: 1,
        }
    }

    pub const fn u16(at: usize) -> Self {
        Self::Field {
            at,
            width: Width::U16,
            unit: 1,
        }
    }

    pub const fn u32(at: usize) -> Self {
        Self::Field {
            at,
            width: Width::U32,
            unit: 1,
        }
    }

    /// Element count read from the owner, times an element size.
    pub const fn scaled(at: usize, width: Width, unit: usize) -> Self {
        Self::Field { at, width, unit }
    }

    pub(crate) fn eval(&self, owner: &Frame<'_>, referent: &Frame<'_>) -> Result<usize, WalkError> {
        match *self {
            Self::Const(len) => Ok(len),
            Self::Field { at, width, unit } => {
                let count = owner.read(at, width)? as usize;
                count.checked_mul(unit).ok_or_else(|| owner.overflow(at))
            }
            Self::CStr => referent.cstr_len(),
            Self::With(f) => f(owner, referent),
        }
    }
}

/// Discriminant of a [`Field::Switch`].
#[derive(Debug)]
pub enum Tag {
    Field { at: usize, width: Width },
    /// Computed from the owner frame. `None` selects the default arm.
    With(fn(&Frame<'_>) -> Result<Option<u32>, WalkError>),
}

impl Tag {
    pub(crate) fn eval(&self, owner: &Frame<'_>) -> Result<Option<u32>, WalkError> {
        match *self {
            Self::Field { at, width } => owner.read(at, width).map(Some),
            Self::With(f) => f(owner),
        }
    }

    pub(crate) fn select(
        &self,
        owner: &Frame<'_>,
        arms: &'static [Arm],
        default: Option<&'static [Field]>,
    ) -> Result<&'static [Field], WalkError> {
        let tag = self.eval(owner)?;
        let arm = tag.and_then(|tag| arms.iter().find(|arm| arm.value == tag));
        match (arm, default) {
            (Some(arm), _) => Ok(arm.fields),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(WalkError::UnknownVariant {
                tag: tag.unwrap_or(NULL_OFFSET),
            }),
        }
    }
}

/// Bounds-checked cursor over one struct inside a block.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    mem: &'a [u8],
    at: usize,
}

impl<'a> Frame<'a> {
    pub const fn new(mem: &'a [u8], at: usize) -> Self {
        Self { mem, at }
    }

    /// Offset of this frame within its block.
    pub const fn offset(&self) -> usize {
        self.at
    }

    /// Frame for a struct embedded `off` bytes into this one.
    pub const fn sub(&self, off: usize) -> Self {
        Self::new(self.mem, self.at.saturating_add(off))
    }

    pub fn bytes(&self, off: usize, len: usize) -> Result<&'a [u8], WalkError> {
        let offset = self.at.saturating_add(off);
        offset
            .checked_add(len)
            .and_then(|end| self.mem.get(offset..end))
            .ok_or(WalkError::OutOfBounds {
                offset,
                size: len,
                len: self.mem.len(),
            })
    }

    /// Error for a size computed from the field at `off` that does not fit
    /// in `usize`.
    pub(crate) fn overflow(&self, off: usize) -> WalkError {
        WalkError::OutOfBounds {
            offset: self.at.saturating_add(off),
            size: usize::MAX,
            len: self.mem.len(),
        }
    }

    pub fn u8(&self, off: usize) -> Result<u8, WalkError> {
        Ok(self.bytes(off, 1)?[0])
    }

    pub fn u16(&self, off: usize) -> Result<u16, WalkError> {
        let b = self.bytes(off, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&self, off: usize) -> Result<u32, WalkError> {
        let b = self.bytes(off, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read(&self, off: usize, width: Width) -> Result<u32, WalkError> {
        match width {
            Width::U8 => self.u8(off).map(u32::from),
            Width::U16 => self.u16(off).map(u32::from),
            Width::U32 => self.u32(off),
        }
    }

    /// Target offset of the pointer field at `off`.
    pub fn ptr(&self, off: usize) -> Result<Option<usize>, WalkError> {
        Ok(match self.u32(off)? {
            NULL_OFFSET => None,
            target => Some(target as usize),
        })
    }

    /// Frame at the target of the pointer field at `off`.
    pub fn deref(&self, off: usize) -> Result<Option<Frame<'a>>, WalkError> {
        Ok(self.ptr(off)?.map(|target| Self::new(self.mem, target)))
    }

    fn cstr_len(&self) -> Result<usize, WalkError> {
        let tail = self.mem.get(self.at..).unwrap_or_default();
        tail.iter()
            .position(|&b| b == 0)
            .map(|nul| nul + 1)
            .ok_or(WalkError::UnterminatedString { offset: self.at })
    }
}

/// Error walking a parameter graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WalkError {
    /// A field or referent lies outside its block
    #[error("read of {size} bytes at {offset:#x} exceeds block of {len} bytes")]
    OutOfBounds {
        /// Offset of the access
        offset: usize,
        /// Size of the access
        size: usize,
        /// Length of the block
        len: usize,
    },
    /// An embedded array count exceeds the array's declared length
    #[error("count {count} exceeds capacity {max}")]
    CountOutOfRange {
        /// Count read from the struct
        count: usize,
        /// Declared array length
        max: usize,
    },
    /// A union discriminant matched no arm
    #[error("no variant for tag {tag:#x}")]
    UnknownVariant {
        /// Discriminant value
        tag: u32,
    },
    /// A string referent has no NUL terminator
    #[error("unterminated string at {offset:#x}")]
    UnterminatedString {
        /// Offset of the string
        offset: usize,
    },
    /// A type code inside a referent is invalid
    #[error("invalid discriminant {value:#x}")]
    InvalidDiscriminant {
        /// Offending value
        value: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    static EMPTY: Schema = Schema::flat("empty", 4);

    static ARMS: [Arm; 1] = [Arm {
        value: 7,
        fields: &[Field::bytes(4, Len::Const(2))],
    }];

    #[test]
    fn test_frame_reads_little_endian() {
        let mem = [0x34, 0x12, 0x78, 0x56, 0xFF, 0xFF, 0xFF, 0xFF];
        let frame = Frame::new(&mem, 0);
        assert_eq!(frame.u16(0).unwrap(), 0x1234);
        assert_eq!(frame.u32(0).unwrap(), 0x5678_1234);
        assert_eq!(frame.read(2, Width::U8).unwrap(), 0x78);
        assert_eq!(frame.ptr(4).unwrap(), None);
        assert!(matches!(
            frame.u32(6),
            Err(WalkError::OutOfBounds {
                offset: 6,
                size: 4,
                len: 8
            })
        ));
    }

    #[test]
    fn test_len_eval() {
        let mem = [3, 0, 0, 0, b'a', b'b', 0, 0];
        let owner = Frame::new(&mem, 0);
        let referent = Frame::new(&mem, 4);
        assert_eq!(Len::Const(5).eval(&owner, &referent).unwrap(), 5);
        assert_eq!(Len::u8(0).eval(&owner, &referent).unwrap(), 3);
        assert_eq!(
            Len::scaled(0, Width::U16, 2)
                .eval(&owner, &referent)
                .unwrap(),
            6
        );
        assert_eq!(Len::CStr.eval(&owner, &referent).unwrap(), 3);

        let unterminated = [b'x'; 4];
        let frame = Frame::new(&unterminated, 0);
        assert_eq!(
            Len::CStr.eval(&frame, &frame).unwrap_err(),
            WalkError::UnterminatedString { offset: 0 }
        );
    }

    #[test]
    fn test_len_eval_overflow() {
        let mem = [0xFF; 8];
        let owner = Frame::new(&mem, 0);
        let huge = Len::scaled(4, Width::U32, usize::MAX / 2 + 1);
        assert_eq!(
            huge.eval(&owner, &owner).unwrap_err(),
            WalkError::OutOfBounds {
                offset: 4,
                size: usize::MAX,
                len: 8
            }
        );

        let far = Frame::new(&mem, usize::MAX - 1);
        assert!(matches!(
            far.bytes(0, 4),
            Err(WalkError::OutOfBounds { size: 4, len: 8, .. })
        ));
        assert!(far.sub(8).u8(0).is_err());
    }

    #[test]
    fn test_tag_select() {
        let mem = [7, 0, 0, 0, 9, 0, 0, 0];
        let tag = Tag::Field {
            at: 0,
            width: Width::U32,
        };

        let fields = tag.select(&Frame::new(&mem, 0), &ARMS, None).unwrap();
        assert_eq!(fields.len(), 1);

        let err = tag.select(&Frame::new(&mem, 4), &ARMS, None).unwrap_err();
        assert_eq!(err, WalkError::UnknownVariant { tag: 9 });

        let fields = tag
            .select(&Frame::new(&mem, 4), &ARMS, Some(EMPTY.fields))
            .unwrap();
        assert!(fields.is_empty());
    }
}
