//! # Rich-text deltas
//!
//! A [`Delta`] is an ordered list of insert/retain/delete [`Op`]s. The same type
//! represents both a whole document (inserts only) and an edit against one;
//! applying an edit is `document.compose(&edit)`.
//!
//! Positions are counted in `char`s, and every embedded object occupies exactly
//! one position.

pub mod attributes;
mod iter;
pub mod op;

use std::ops::Range;

use serde::{Deserialize, Serialize};

use iter::OpIterator;
pub use op::{Attributes, Embed, InsertValue, MalformedEmbed, Op, OpKind, attr, attrs, kinds};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut delta = Self::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total length of all ops
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::len).sum()
    }

    pub fn insert(&mut self, text: impl Into<String>, attributes: Option<Attributes>) -> &mut Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        self.push(Op::text(text, attributes))
    }

    pub fn insert_embed(&mut self, embed: Embed, attributes: Option<Attributes>) -> &mut Self {
        self.push(Op::embed(embed, attributes))
    }

    pub fn retain(&mut self, len: usize, attributes: Option<Attributes>) -> &mut Self {
        if len == 0 {
            return self;
        }
        self.push(Op::retain(len, attributes))
    }

    pub fn delete(&mut self, len: usize) -> &mut Self {
        if len == 0 {
            return self;
        }
        self.push(Op::delete(len))
    }

    /// Append an op, merging it with the previous one where possible.
    ///
    /// Adjacent deletes merge; adjacent text inserts or retains with equal
    /// attributes merge; an insert following a delete is placed before it so
    /// that equivalent deltas have one canonical form.
    pub fn push(&mut self, op: Op) -> &mut Self {
        if op.is_empty() {
            return self;
        }

        let mut index = self.ops.len();
        if let Some(last) = self.ops.last_mut() {
            if let (Op::Delete { delete: last_len }, Op::Delete { delete }) = (&mut *last, &op) {
                *last_len += delete;
                return self;
            }
        }

        if matches!(self.ops.last(), Some(Op::Delete { .. })) && op.kind() == OpKind::Insert {
            index -= 1;
            if index == 0 {
                self.ops.insert(0, op);
                return self;
            }
        }

        if index > 0 {
            let prev = &mut self.ops[index - 1];
            match (prev, &op) {
                (
                    Op::Insert {
                        insert: InsertValue::Text(prev_text),
                        attributes: prev_attrs,
                    },
                    Op::Insert {
                        insert: InsertValue::Text(text),
                        attributes,
                    },
                ) if prev_attrs == attributes => {
                    prev_text.push_str(text);
                    return self;
                }
                (
                    Op::Retain {
                        retain: prev_len,
                        attributes: prev_attrs,
                    },
                    Op::Retain { retain, attributes },
                ) if prev_attrs == attributes => {
                    *prev_len += retain;
                    return self;
                }
                _ => {}
            }
        }

        self.ops.insert(index, op);
        self
    }

    /// Drop a trailing retain that carries no attributes.
    pub fn chop(&mut self) -> &mut Self {
        if let Some(Op::Retain { attributes, .. }) = self.ops.last()
            && attributes.is_empty()
        {
            self.ops.pop();
        }
        self
    }

    /// Compose `other` after `self` into a single equivalent delta.
    pub fn compose(&self, other: &Delta) -> Delta {
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut delta = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_kind() == OpKind::Insert {
                delta.push(other_iter.next_op());
            } else if this_iter.peek_kind() == OpKind::Delete {
                delta.push(this_iter.next_op());
            } else {
                let len = this_iter.peek_len().min(other_iter.peek_len());
                let this_op = this_iter.next(len);
                let other_op = other_iter.next(len);
                match (this_op, other_op) {
                    (
                        Op::Retain { attributes: a, .. },
                        Op::Retain {
                            retain,
                            attributes: b,
                        },
                    ) => {
                        let attributes = attributes::compose(&a, &b, true);
                        delta.push(Op::Retain { retain, attributes });
                    }
                    (
                        Op::Insert {
                            insert,
                            attributes: a,
                        },
                        Op::Retain { attributes: b, .. },
                    ) => {
                        let attributes = attributes::compose(&a, &b, false);
                        delta.push(Op::Insert { insert, attributes });
                    }
                    (Op::Retain { .. }, delete @ Op::Delete { .. }) => {
                        delta.push(delete);
                    }
                    // an insert followed by a delete of the same span cancels out
                    _ => {}
                }
            }
        }

        delta.chop();
        delta
    }

    /// Ops covering positions `start..end`
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut sliced = Delta::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0;
        while index < end && iter.has_next() {
            let op = if index < start {
                iter.next(start - index)
            } else {
                let op = iter.next(end - index);
                sliced.push(op.clone());
                op
            };
            index += op.len();
        }
        sliced
    }

    /// Concatenated text of the text inserts in `range`; embeds contribute nothing.
    pub fn text_in(&self, range: Range<usize>) -> String {
        self.slice(range.start, range.end)
            .ops
            .iter()
            .filter_map(|op| op.insert_value().and_then(InsertValue::as_text))
            .collect()
    }

    /// Concatenated text of every text insert
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| op.insert_value().and_then(InsertValue::as_text))
            .collect()
    }
}

impl FromIterator<Op> for Delta {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self::from_ops(iter)
    }
}
