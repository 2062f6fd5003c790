use indexmap::IndexSet;

use crate::language::NodeId;

/// Markup and member ids accumulated for one container while it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) start: Option<NodeId>,
    pub(crate) offset: usize,
    pub(crate) content: String,
    pub(crate) nodes: IndexSet<NodeId>,
}

impl Frame {
    fn new(start: Option<NodeId>, offset: usize) -> Frame {
        Frame {
            start,
            offset,
            content: String::new(),
            nodes: IndexSet::new(),
        }
    }

    /// Record a node belonging to this container and put its placeholder
    /// into the markup where the tag was.
    pub(crate) fn place(&mut self, id: &str) {
        self.content
            .push_str(id);
        self.nodes
            .insert(id.to_string());
    }
}

/// Stack of open containers. The bottom frame is the document itself and
/// is never popped by block handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scope {
    stack: Vec<Frame>,
}

impl Scope {
    pub(crate) fn new() -> Scope {
        Scope {
            stack: vec![Frame::new(None, 0)],
        }
    }

    pub(crate) fn current(&mut self) -> &mut Frame {
        if self
            .stack
            .is_empty()
        {
            self.stack
                .push(Frame::new(None, 0));
        }
        let last = self
            .stack
            .len()
            - 1;
        &mut self.stack[last]
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack
            .len()
            - 1
    }

    pub(crate) fn push(&mut self, start: NodeId, offset: usize) {
        let mut frame = Frame::new(Some(start.clone()), offset);
        frame
            .nodes
            .insert(start);
        self.stack
            .push(frame);
    }

    /// Close the innermost block. Returns None if only the document frame
    /// remains.
    pub(crate) fn pop(&mut self) -> Option<Frame> {
        if self.depth() == 0 {
            return None;
        }
        self.stack
            .pop()
    }

    /// Take the document frame once parsing has finished, or the innermost
    /// frame still open if a block was never closed.
    pub(crate) fn finish(mut self) -> Result<Frame, Frame> {
        if self.depth() > 0 {
            match self
                .stack
                .pop()
            {
                Some(frame) => Err(frame),
                None => Ok(Frame::new(None, 0)),
            }
        } else {
            Ok(self
                .stack
                .pop()
                .unwrap_or_else(|| Frame::new(None, 0)))
        }
    }
}
