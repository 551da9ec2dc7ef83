//! Validation of a received parameter buffer.
//!
//! Offsets in a pushed buffer are already relative to the buffer start, so
//! there is nothing to rewrite. Instead the walk mirrors [`push`] and checks
//! that every non-null pointer lands exactly where push would have placed
//! its referent. A buffer that passes can be read through the returned
//! [`View`] without further bounds surprises.
//!
//! [`push`]: crate::push::push

use alloc::collections::VecDeque;

use crate::{
    arena::View,
    push::{Block, Cursor, Overflow},
    schema::{Field, Frame, Kind, Schema, WalkError},
};

/// Validate `bytes` as a pushed `schema` parameter.
pub fn pop<'a>(schema: &'static Schema, bytes: &'a [u8]) -> Result<View<'a>, PopError> {
    if bytes.len() < schema.size {
        return Err(PopError::BufferTooSmall {
            required: schema.size,
            available: bytes.len(),
        });
    }

    let mut cursor = Cursor::new(bytes.len());
    let base = place(&mut cursor, schema.size)?;

    let mut pending = VecDeque::new();
    pending.push_back(Block {
        schema,
        count: 1,
        src: base,
        dst: base,
    });

    while let Some(block) = pending.pop_front() {
        for i in 0..block.count {
            let owner = Frame::new(bytes, block.src + i * block.schema.size);
            walk(block.schema.fields, &owner, &mut cursor, &mut pending)?;
        }
    }

    Ok(View::new(bytes))
}

fn place(cursor: &mut Cursor, size: usize) -> Result<usize, PopError> {
    cursor
        .place(size)
        .map_err(|Overflow { required, available }| PopError::BufferTooSmall { required, available })
}

fn walk(
    fields: &'static [Field],
    owner: &Frame<'_>,
    cursor: &mut Cursor,
    pending: &mut VecDeque<Block>,
) -> Result<(), PopError> {
    for field in fields {
        match field {
            Field::Ptr { at, kind } => {
                let Some(referent) = owner.deref(*at)? else {
                    continue;
                };
                let size = match kind {
                    Kind::Bytes(len) => len.eval(owner, &referent)?,
                    Kind::Array { schema, count } => {
                        let count = count.eval(owner, &referent)?;
                        let size = count
                            .checked_mul(schema.size)
                            .ok_or_else(|| owner.overflow(*at))?;
                        if count > 0 && !schema.fields.is_empty() {
                            pending.push_back(Block {
                                schema: *schema,
                                count,
                                src: referent.offset(),
                                dst: referent.offset(),
                            });
                        }
                        size
                    }
                };
                let expected = place(cursor, size)?;
                if referent.offset() != expected {
                    return Err(PopError::Misplaced {
                        expected,
                        found: referent.offset(),
                    });
                }
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
                    walk(schema.fields, &owner.sub(at + i * schema.size), cursor, pending)?;
                }
            }
            Field::Switch { tag, arms, default } => {
                let fields = tag.select(owner, *arms, *default)?;
                walk(fields, owner, cursor, pending)?;
            }
        }
    }
    Ok(())
}

/// Error validating a received parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PopError {
    /// The buffer ends before the parameter does
    #[error("buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed
        required: usize,
        /// Bytes received
        available: usize,
    },
    /// A pointer does not sit where the sender would have placed it
    #[error("referent at {found:#x}, expected {expected:#x}")]
    Misplaced {
        /// Canonical offset
        expected: usize,
        /// Offset found in the pointer field
        found: usize,
    },
    /// The graph is malformed
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
        push::push,
        schema::{Len, Width},
    };

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Frag {
        head: Ptr<[u8]>,
        tail: Ptr<[u8]>,
        head_len: U16,
        tail_len: U16,
    }

    static FRAG: Schema = Schema {
        name: "Frag",
        size: size_of::<Frag>(),
        fields: &[Field::bytes(0, Len::u16(8)), Field::bytes(4, Len::u16(10))],
    };

    fn pushed(head: &[u8], tail: Option<&[u8]>) -> vec::Vec<u8> {
        let mut arena = Arena::new();
        let head_ref = arena.alloc_bytes(head);
        let tail_ref = tail.map(|tail| arena.alloc_bytes(tail));
        let root = arena.alloc(&Frag {
            head: head_ref.into(),
            tail: Ptr::new(tail_ref),
            head_len: U16::new(head.len() as u16),
            tail_len: U16::new(tail.map_or(0, <[u8]>::len) as u16),
        });

        let mut buf = vec![0u8; 128];
        let used = push(&FRAG, arena.as_bytes(), root.offset() as usize, &mut buf).unwrap();
        buf.truncate(used);
        buf
    }

    #[test]
    fn test_pop_round_trip() {
        let buf = pushed(b"hello", Some(b"world!"));
        let view = pop(&FRAG, &buf).unwrap();

        let frag = view.root::<Frag>().unwrap();
        assert_eq!(frag.head.get(), Some(Ref::from_offset(12)));
        assert_eq!(view.follow_slice(&frag.head, 5).unwrap(), b"hello");
        assert_eq!(view.follow_slice(&frag.tail, 6).unwrap(), b"world!");
    }

    #[test]
    fn test_pop_null_round_trip() {
        let buf = pushed(b"abc", None);
        let view = pop(&FRAG, &buf).unwrap();
        assert!(view.root::<Frag>().unwrap().tail.is_null());
    }

    #[test]
    fn test_pop_rejects_swapped_referents() {
        let mut buf = pushed(b"abcd", Some(b"efgh"));
        let frag = Frag::mut_from_prefix(&mut buf).unwrap().0;
        let head = frag.head;
        frag.head = frag.tail;
        frag.tail = head;

        assert_eq!(
            pop(&FRAG, &buf).unwrap_err(),
            PopError::Misplaced {
                expected: 12,
                found: 16
            }
        );
    }

    #[test]
    fn test_pop_rejects_truncated_buffer() {
        let buf = pushed(b"hello", Some(b"world!"));
        assert!(matches!(
            pop(&FRAG, &buf[..20]),
            Err(PopError::BufferTooSmall { .. })
        ));
        assert!(matches!(
            pop(&FRAG, &buf[..8]),
            Err(PopError::BufferTooSmall {
                required: 12,
                available: 8
            })
        ));
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

    fn words(count: u32) -> vec::Vec<u8> {
        let mut buf = Words {
            items: Ptr::new(Some(Ref::from_offset(8))),
            count: U32::new(count),
        }
        .as_bytes()
        .to_vec();
        buf.extend_from_slice(&[0; 8]);
        buf
    }

    #[test]
    fn test_pop_rejects_huge_counts() {
        assert!(pop(&WORDS, &words(2)).is_ok());

        // Counts whose byte size wraps a 32-bit usize must not pass as a
        // small region.
        for count in [0x4000_0001, u32::MAX] {
            let err = pop(&WORDS, &words(count)).unwrap_err();
            assert!(matches!(
                err,
                PopError::BufferTooSmall { available: 16, .. }
                    | PopError::Walk(WalkError::OutOfBounds { .. })
            ));
        }

        assert_eq!(
            pop(&HUGE, &words(2)).unwrap_err(),
            PopError::Walk(WalkError::OutOfBounds {
                offset: 0,
                size: usize::MAX,
                len: 16
            })
        );
    }
}
