use super::op::{InsertValue, Op, OpKind};

/// Walks a sequence of ops, handing out pieces of at most a requested length.
///
/// Once exhausted the iterator behaves as an endless attribute-less retain.
pub(crate) struct OpIterator<'a> {
    ops: &'a [Op],
    index: usize,
    offset: usize,
}

impl<'a> OpIterator<'a> {
    pub(crate) fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub(crate) fn has_next(&self) -> bool {
        self.peek_len() < usize::MAX
    }

    pub(crate) fn peek_len(&self) -> usize {
        match self.ops.get(self.index) {
            Some(op) => op.len() - self.offset,
            None => usize::MAX,
        }
    }

    pub(crate) fn peek_kind(&self) -> OpKind {
        self.ops
            .get(self.index)
            .map(Op::kind)
            .unwrap_or(OpKind::Retain)
    }

    /// Take the whole remainder of the current op.
    pub(crate) fn next_op(&mut self) -> Op {
        self.next(usize::MAX)
    }

    pub(crate) fn next(&mut self, len: usize) -> Op {
        let Some(op) = self.ops.get(self.index) else {
            return Op::retain(len, None);
        };

        let offset = self.offset;
        let remaining = op.len() - offset;
        let len = len.min(remaining);
        if len == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += len;
        }

        match op {
            Op::Delete { .. } => Op::delete(len),
            Op::Retain { attributes, .. } => Op::Retain {
                retain: len,
                attributes: attributes.clone(),
            },
            Op::Insert {
                insert: InsertValue::Text(text),
                attributes,
            } => Op::Insert {
                insert: InsertValue::Text(text.chars().skip(offset).take(len).collect()),
                attributes: attributes.clone(),
            },
            Op::Insert { insert, attributes } => Op::Insert {
                insert: insert.clone(),
                attributes: attributes.clone(),
            },
        }
    }
}
