// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{eid, Controller, Result};

/// Walks every user id by chunks, a failed query is yielded once and ends
/// the iteration.
pub struct LazyUserChunks<'a, C: Controller> {
    pub(crate) curr_offset: usize,
    pub(crate) chunk_size: usize,
    pub(crate) failed: bool,
    pub(crate) controller: &'a C,
}

impl<'a, C: Controller> Iterator for LazyUserChunks<'a, C> {
    type Item = Result<Vec<eid!(C::User)>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.chunk_size == 0 {
            return None;
        }

        let user_ids = self
            .controller
            .user_ids_offset_limit(self.curr_offset, self.chunk_size);

        self.curr_offset += self.chunk_size;
        match user_ids {
            Ok(user_ids) => {
                if user_ids.is_empty() {
                    None
                } else {
                    Some(Ok(user_ids))
                }
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
