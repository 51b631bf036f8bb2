use std::collections::BTreeMap;

use crate::style::StyleBlock;

use super::category::Category;

/// Blocks currently open, one slot per category.
///
/// Closing moves a block into the finished list with its final `max`.
#[derive(Debug, Default)]
pub(crate) struct OpenBlocks {
    open: BTreeMap<Category, StyleBlock>,
    finished: Vec<StyleBlock>,
}

impl OpenBlocks {
    /// Open `block` in `category`, first closing whatever the category held.
    pub fn open(&mut self, category: Category, block: StyleBlock) {
        let at = block.min;
        self.close(category, at);
        self.open.insert(category, block);
    }

    /// Open a block only if the category is empty.
    pub fn ensure(&mut self, category: Category, block: StyleBlock) {
        self.open.entry(category).or_insert(block);
    }

    /// Close the block in `category` at `at`. False when nothing was open.
    pub fn close(&mut self, category: Category, at: usize) -> bool {
        match self.open.remove(&category) {
            Some(mut block) => {
                block.max = at;
                self.finished.push(block);
                true
            }
            None => false,
        }
    }

    pub fn close_many(&mut self, categories: &[Category], at: usize) {
        for category in categories {
            self.close(*category, at);
        }
    }

    pub fn get(&self, category: Category) -> Option<&StyleBlock> {
        self.open.get(&category)
    }

    /// Add a block that is already complete.
    pub fn push_finished(&mut self, block: StyleBlock) {
        self.finished.push(block);
    }

    /// Close everything still open at `at` and hand back all blocks.
    pub fn finish(mut self, at: usize) -> Vec<StyleBlock> {
        for (_, mut block) in std::mem::take(&mut self.open) {
            block.max = at;
            self.finished.push(block);
        }
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Payload;

    #[test]
    fn opening_closes_same_category() {
        let mut open = OpenBlocks::default();
        open.open(Category::Paragraph, StyleBlock::open("p", 0, Payload::Plain));
        open.open(Category::Paragraph, StyleBlock::open("m", 5, Payload::Plain));
        let blocks = open.finish(9);
        assert_eq!(blocks[0], StyleBlock::new("p", 0, 5));
        assert_eq!(blocks[1], StyleBlock::new("m", 5, 9));
    }

    #[test]
    fn closing_empty_category_reports_false() {
        let mut open = OpenBlocks::default();
        assert!(!open.close(Category::Character, 3));
        assert!(open.finish(3).is_empty());
    }

    #[test]
    fn ensure_keeps_existing_block() {
        let mut open = OpenBlocks::default();
        open.ensure(Category::List, StyleBlock::open("list", 0, Payload::Virtual));
        open.ensure(Category::List, StyleBlock::open("list", 4, Payload::Virtual));
        assert_eq!(open.get(Category::List).map(|b| b.min), Some(0));
    }
}
