/// Wrapping selection over a list
pub trait Navigable {
    fn get_item_count(&self) -> usize;

    fn get_selected_index(&self) -> usize;

    fn set_selected_index(&mut self, index: usize);

    /// Moves to the next item (wraps around to start)
    fn next_item(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            let next = (self.get_selected_index() + 1) % count;
            self.set_selected_index(next);
        }
    }

    /// Moves to the previous item (wraps around to end)
    fn previous_item(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            let prev = match self.get_selected_index() {
                0 => count - 1,
                index => index.min(count) - 1,
            };
            self.set_selected_index(prev);
        }
    }
}

impl Navigable for crate::app::App {
    fn get_item_count(&self) -> usize {
        self.sidebar_rows().len()
    }

    fn get_selected_index(&self) -> usize {
        self.sidebar_index
    }

    fn set_selected_index(&mut self, index: usize) {
        self.sidebar_index = index;
    }
}
