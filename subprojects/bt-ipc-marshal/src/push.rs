//! Deep copy of a parameter graph into a fixed-capacity buffer.
//!
//! Placement is canonical and breadth-first. The root struct goes first.
//! Then each referent is written at the next [`ALIGN`]-byte boundary, in the
//! order its pointer is met: fields in schema order, embedded arrays
//! element by element, and union arms in place. Struct arrays are queued,
//! and their own pointers are walked once the current block is done. For a
//! GATT service this yields root, attribute table, per-attribute uuid and
//! user data, then the characteristic uuids nested in that user data.
//!
//! [`ALIGN`]: crate::arena::ALIGN

use alloc::collections::VecDeque;

use crate::{
    arena::align_up,
    schema::{Field, Frame, Kind, Schema, WalkError},
};

/// Serialize the `schema` struct at `root` in `src` into `dst`.
///
/// Returns the number of bytes used. Nothing is written at or past
/// `dst.len()`; on error the contents of `dst` are unspecified.
pub fn push(schema: &'static Schema, src: &[u8], root: usize, dst: &mut [u8]) -> Result<usize, PushError> {
    let mut writer = Writer::new(dst);
    let root_bytes = Frame::new(src, root).bytes(0, schema.size)?;
    let base = writer.put(root_bytes)?;

    let mut pending = VecDeque::new();
    pending.push_back(Block {
        schema,
        count: 1,
        src: root,
        dst: base,
    });

    while let Some(block) = pending.pop_front() {
        for i in 0..block.count {
            let stride = i * block.schema.size;
            let owner = Frame::new(src, block.src + stride);
            walk(block.schema.fields, &owner, block.dst + stride, &mut writer, &mut pending)?;
        }
    }

    Ok(writer.used())
}

/// Struct array whose pointer fields still have to be walked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Block {
    pub schema: &'static Schema,
    pub count: usize,
    pub src: usize,
    pub dst: usize,
}

fn walk(
    fields: &'static [Field],
    owner: &Frame<'_>,
    dst: usize,
    writer: &mut Writer<'_>,
    pending: &mut VecDeque<Block>,
) -> Result<(), PushError> {
    for field in fields {
        match field {
            Field::Ptr { at, kind } => {
                let Some(referent) = owner.deref(*at)? else {
                    writer.patch(dst + at, None);
                    continue;
                };
                let placed = match kind {
                    Kind::Bytes(len) => {
                        let len = len.eval(owner, &referent)?;
                        writer.put(referent.bytes(0, len)?)?
                    }
                    Kind::Array { schema, count } => {
                        let count = count.eval(owner, &referent)?;
                        let size = count
                            .checked_mul(schema.size)
                            .ok_or_else(|| owner.overflow(*at))?;
                        let placed = writer.put(referent.bytes(0, size)?)?;
                        if count > 0 && !schema.fields.is_empty() {
                            pending.push_back(Block {
                                schema: *schema,
                                count,
                                src: referent.offset(),
                                dst: placed,
                            });
                        }
                        placed
                    }
                };
                writer.patch(dst + at, Some(placed));
            }
            Field::Inline {
                at,
                schema,
                count,
                capacity,
            } => {
                let count = count.eval(owner, owner)?;
                if count > *capacity {
                    return Err(WalkError::CountOutOfRange {
                        count,
                        max: *capacity,
                    }
                    .into());
                }
                for i in 0..count {
                    let off = at + i * schema.size;
                    walk(schema.fields, &owner.sub(off), dst + off, writer, pending)?;
                }
            }
            Field::Switch { tag, arms, default } => {
                let fields = tag.select(owner, *arms, *default)?;
                walk(fields, owner, dst, writer, pending)?;
            }
        }
    }
    Ok(())
}

/// Monotonic placement cursor shared by push and pop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor {
    end: usize,
    limit: usize,
}

impl Cursor {
    pub fn new(limit: usize) -> Self {
        Self { end: 0, limit }
    }

    /// Reserve `size` bytes at the current position and advance past them,
    /// rounding up to the block alignment.
    pub fn place(&mut self, size: usize) -> Result<usize, Overflow> {
        let at = self.end;
        let required = at.saturating_add(size);
        if required > self.limit {
            return Err(Overflow {
                required,
                available: self.limit,
            });
        }
        self.end = align_up(required).min(self.limit);
        Ok(at)
    }

    pub fn used(&self) -> usize {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overflow {
    pub required: usize,
    pub available: usize,
}

impl From<Overflow> for PushError {
    fn from(Overflow { required, available }: Overflow) -> Self {
        Self::Overflow { required, available }
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    cursor: Cursor,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        let cursor = Cursor::new(buf.len());
        Self { buf, cursor }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<usize, PushError> {
        let at = self.cursor.place(bytes.len())?;
        let end = at + bytes.len();
        self.buf[at..end].copy_from_slice(bytes);
        self.buf[end..self.cursor.used()].fill(0);
        Ok(at)
    }

    fn patch(&mut self, at: usize, target: Option<usize>) {
        let raw = target.map_or(crate::arena::NULL_OFFSET, |target| target as u32);
        self.buf[at..at + 4].copy_from_slice(&raw.to_le_bytes());
    }

    fn used(&self) -> usize {
        self.cursor.used()
    }
}

/// Error serializing a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushError {
    /// The parameter does not fit in the buffer
    #[error("parameter does not fit: need {required} bytes, have {available}")]
    Overflow {
        /// Bytes needed up to and including the failing write
        required: usize,
        /// Buffer capacity
        available: usize,
    },
    /// The envelope could not be allocated
    #[error("envelope allocation of {size} bytes failed")]
    Alloc {
        /// Requested size
        size: usize,
    },
    /// The source graph is malformed
    #[error(transparent)]
    Walk(#[from] WalkError),
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use zerocopy::{
        FromBytes, Immutable, IntoBytes, KnownLayout,
        little_endian::{U16, U32},
    };

    use super::*;
    use crate::{
        arena::{Arena, Ptr, Ref},
        schema::{Len, Width},
    };

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Payload {
        data: Ptr<[u8]>,
        len: U16,
        _padding: [u8; 2],
    }

    static PAYLOAD: Schema = Schema {
        name: "Payload",
        size: size_of::<Payload>(),
        fields: &[Field::bytes(0, Len::u16(4))],
    };

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Table {
        items: Ptr<[Payload]>,
        count: u8,
        _padding: [u8; 3],
    }

    static TABLE: Schema = Schema {
        name: "Table",
        size: size_of::<Table>(),
        fields: &[Field::array(0, &PAYLOAD, Len::u8(4))],
    };

    fn payload(arena: &mut Arena, data: &[u8]) -> Payload {
        Payload {
            data: arena.alloc_bytes(data).into(),
            len: U16::new(data.len() as u16),
            _padding: [0; 2],
        }
    }

    #[test]
    fn test_push_single_referent() {
        let mut arena = Arena::new();
        arena.alloc_bytes(&[0xEE; 5]);
        let param = payload(&mut arena, &[1, 2, 3, 4, 5, 6]);
        let root = arena.alloc(&param);

        let mut buf = vec![0u8; 64];
        let used = push(&PAYLOAD, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap();

        assert_eq!(used, 8 + 8);
        assert_eq!(&buf[0..4], &8u32.to_le_bytes());
        assert_eq!(&buf[4..6], &6u16.to_le_bytes());
        assert_eq!(&buf[8..14], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_push_breadth_first_order() {
        let mut arena = Arena::new();
        let items = [payload(&mut arena, b"abc"), payload(&mut arena, b"defgh")];
        let items = arena.alloc_slice(&items);
        let root = arena.alloc(&Table {
            items: items.into(),
            count: 2,
            _padding: [0; 3],
        });

        let mut buf = vec![0u8; 64];
        let used = push(&TABLE, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap();

        // root (8) | items (16) | "abc" (4) | "defgh" (8)
        assert_eq!(used, 36);
        let view = crate::arena::View::new(&buf[..used]);
        let table = view.root::<Table>().unwrap();
        assert_eq!(table.items.get(), Some(Ref::from_offset(8)));
        let items = view.follow_slice(&table.items, 2).unwrap();
        assert_eq!(items[0].data.get(), Some(Ref::from_offset(24)));
        assert_eq!(items[1].data.get(), Some(Ref::from_offset(28)));
        assert_eq!(&buf[28..33], b"defgh");
    }

    #[test]
    fn test_push_null_and_empty_referents() {
        let mut arena = Arena::new();
        let empty = payload(&mut arena, &[]);
        let null = Payload {
            data: Ptr::null(),
            len: U16::new(0),
            _padding: [0; 2],
        };
        let items = arena.alloc_slice(&[empty, null]);
        let root = arena.alloc(&Table {
            items: items.into(),
            count: 2,
            _padding: [0; 3],
        });

        let mut buf = vec![0u8; 64];
        let used = push(&TABLE, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap();

        assert_eq!(used, 24);
        let view = crate::arena::View::new(&buf[..used]);
        let items = view
            .follow_slice(&view.root::<Table>().unwrap().items, 2)
            .unwrap();
        assert_eq!(items[0].data.get(), Some(Ref::from_offset(24)));
        assert!(items[1].data.is_null());
    }

    #[test]
    fn test_push_overflow_leaves_canary() {
        let mut arena = Arena::new();
        let param = payload(&mut arena, &[7; 9]);
        let root = arena.alloc(&param);

        // Needs 8 + 9 = 17 bytes.
        let mut buf = vec![0xA5u8; 16 + 4];
        let err = push(&PAYLOAD, arena.as_bytes(), root.offset() as usize, &mut buf[..16]).unwrap_err();

        assert_eq!(
            err,
            PushError::Overflow {
                required: 17,
                available: 16
            }
        );
        assert_eq!(&buf[16..], &[0xA5; 4]);
    }

    #[test]
    fn test_push_rejects_dangling_source() {
        let mut arena = Arena::new();
        let root = arena.alloc(&Payload {
            data: Ptr::new(Some(Ref::from_offset(0x100))),
            len: U16::new(4),
            _padding: [0; 2],
        });

        let mut buf = vec![0u8; 64];
        let err = push(&PAYLOAD, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap_err();
        assert!(matches!(err, PushError::Walk(WalkError::OutOfBounds { .. })));
    }

    #[test]
    fn test_cursor_alignment() {
        let mut cursor = Cursor::new(10);
        assert_eq!(cursor.place(3).unwrap(), 0);
        assert_eq!(cursor.place(0).unwrap(), 4);
        assert_eq!(cursor.place(5).unwrap(), 4);
        assert_eq!(cursor.used(), 10);
        assert!(cursor.place(1).is_err());

        let mut cursor = Cursor::new(16);
        cursor.place(4).unwrap();
        assert_eq!(
            cursor.place(usize::MAX),
            Err(Overflow {
                required: usize::MAX,
                available: 16
            })
        );
        assert_eq!(cursor.used(), 4);
    }

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Words {
        items: Ptr<[U32]>,
        count: U32,
    }

    static WORDS: Schema = Schema {
        name: "Words",
        size: size_of::<Words>(),
        fields: &[Field::bytes(0, Len::scaled(4, Width::U32, 4))],
    };

    static HUGE_ITEMS: Schema = Schema::flat("HugeItem", usize::MAX / 2 + 1);

    static HUGE: Schema = Schema {
        name: "Huge",
        size: size_of::<Words>(),
        fields: &[Field::array(0, &HUGE_ITEMS, Len::u32(4))],
    };

    #[test]
    fn test_push_rejects_huge_counts() {
        let mut arena = Arena::new();
        let items = arena.alloc_slice(&[U32::new(1), U32::new(2)]);
        let root = arena.alloc(&Words {
            items: items.into(),
            count: U32::new(u32::MAX),
        });

        let mut buf = vec![0xA5u8; 64];
        let err = push(&WORDS, arena.as_bytes(), root.offset() as usize, &mut buf[..32]).unwrap_err();
        assert!(matches!(err, PushError::Walk(WalkError::OutOfBounds { .. })));
        assert_eq!(&buf[32..], &[0xA5; 32]);

        arena.resolve_mut(root).unwrap().count = U32::new(2);
        let err = push(&HUGE, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap_err();
        assert_eq!(
            err,
            PushError::Walk(WalkError::OutOfBounds {
                offset: root.offset() as usize,
                size: usize::MAX,
                len: arena.len()
            })
        );
    }
}
