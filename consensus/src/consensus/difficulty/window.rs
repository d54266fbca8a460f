/// One sampled block of the difficulty window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyBlock {
    pub timestamp: u64,
    pub bits: u32,
}

/// A window of recent selected-chain blocks feeding the difficulty
/// adjustment. Order of insertion does not matter; only the timestamp
/// extremes and the target average do.
#[derive(Debug, Clone, Default)]
pub struct DifficultyWindow {
    blocks: Vec<DifficultyBlock>,
}

impl DifficultyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, block: DifficultyBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[DifficultyBlock] {
        &self.blocks
    }

    /// Milliseconds between the earliest and latest block of the window
    pub fn timespan(&self) -> Option<u64> {
        let min = self.blocks.iter().map(|block| block.timestamp).min()?;
        let max = self.blocks.iter().map(|block| block.timestamp).max()?;
        Some(max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespan_spans_the_extremes() {
        let mut window = DifficultyWindow::new();
        assert_eq!(window.timespan(), None);
        for timestamp in [500u64, 100, 900, 300] {
            window.add(DifficultyBlock { timestamp, bits: 0x1f00ffff });
        }
        assert_eq!(window.timespan(), Some(800));
        assert_eq!(window.len(), 4);
    }
}
