// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use prettytable::{cell, format::consts::FORMAT_NO_LINESEP, row, table, Table};
use std::{collections::HashMap, fmt::Display, hash::Hash};

pub trait Entity {
    /// Ids are ordered, ties on rankings are broken by ascending id
    type Id: Clone + Hash + Eq + Ord + Display + Send + Sync;

    fn get_id(&self) -> Self::Id;
    fn get_data(&self) -> HashMap<String, String> {
        Default::default()
    }
}

pub trait ToTable {
    fn to_table(&self) -> Table;
}

impl<E: Entity> ToTable for E {
    fn to_table(&self) -> Table {
        let mut table = table![["id", self.get_id()]];

        let mut data: Vec<_> = self.get_data().into_iter().collect();
        data.sort();
        for (key, val) in data {
            table.add_row(row![key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

impl<K, V, B> ToTable for HashMap<K, V, B>
where
    K: ToString,
    V: ToString,
{
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        for (key, val) in self {
            table.add_row(row![key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

// Ranked lists keep their order
impl<K, V> ToTable for Vec<(K, V)>
where
    K: ToString,
    V: ToString,
{
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        for (pos, (key, val)) in self.iter().enumerate() {
            table.add_row(row![pos + 1, key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}
