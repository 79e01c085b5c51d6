//! Blocks: variables moved as one rigid unit.

use crate::variable::Variable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct BlockId(pub(crate) usize);

/// Running sums for the closed-form least-squares position of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PositionStats {
    pub(crate) scale: f64,
    ab: f64,
    ad: f64,
    a2: f64,
}

impl PositionStats {
    pub(crate) fn new(scale: f64) -> Self {
        Self {
            scale,
            ab: 0.0,
            ad: 0.0,
            a2: 0.0,
        }
    }

    pub(crate) fn add_variable(&mut self, v: &Variable) {
        let ai = self.scale / v.scale;
        let bi = v.offset / v.scale;
        let wi = v.weight;
        self.ab += wi * ai * bi;
        self.ad += wi * ai * v.desired_position;
        self.a2 += wi * ai * ai;
    }

    pub(crate) fn reset(&mut self) {
        self.ab = 0.0;
        self.ad = 0.0;
        self.a2 = 0.0;
    }

    pub(crate) fn posn(&self) -> f64 {
        (self.ad - self.ab) / self.a2
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) vars: Vec<usize>,
    pub(crate) ps: PositionStats,
    pub(crate) posn: f64,
    list_index: usize,
}

impl Block {
    pub(crate) fn new(scale: f64) -> Self {
        Self {
            vars: Vec::new(),
            ps: PositionStats::new(scale),
            posn: 0.0,
            list_index: usize::MAX,
        }
    }
}

/// Slot storage for blocks plus the swap-remove list of live ones.
///
/// Freed slots are recycled, so a `BlockId` is only meaningful while its block is live.
#[derive(Debug, Clone, Default)]
pub(crate) struct Blocks {
    slots: Vec<Block>,
    free: Vec<BlockId>,
    list: Vec<BlockId>,
}

impl Blocks {
    pub(crate) fn alloc(&mut self, block: Block) -> BlockId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = block;
                id
            }
            None => {
                self.slots.push(block);
                BlockId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn insert(&mut self, id: BlockId) {
        self.slots[id.0].list_index = self.list.len();
        self.list.push(id);
    }

    pub(crate) fn remove(&mut self, id: BlockId) {
        let idx = self.slots[id.0].list_index;
        self.list.swap_remove(idx);
        if let Some(&moved) = self.list.get(idx) {
            self.slots[moved.0].list_index = idx;
        }
        self.slots[id.0].list_index = usize::MAX;
        self.slots[id.0].vars.clear();
        self.free.push(id);
    }

    pub(crate) fn get(&self, id: BlockId) -> &Block {
        &self.slots[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.slots[id.0]
    }

    pub(crate) fn ids(&self) -> &[BlockId] {
        &self.list
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }
}
