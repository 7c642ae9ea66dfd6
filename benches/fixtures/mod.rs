// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

fn ascii_repeat_to_len(prefix: &str, fill: char, target_len: usize) -> String {
    if prefix.len() >= target_len {
        return prefix[..target_len].to_owned();
    }

    let mut out = String::with_capacity(target_len);
    out.push_str(prefix);
    while out.len() < target_len {
        out.push(fill);
    }
    out
}

pub mod tree {
    use nodegram::{ConnectOptions, Diagram, DiagramConfig, Direction, NodeId};

    use super::ascii_repeat_to_len;

    #[derive(Debug, Clone, Copy)]
    pub struct TreeParams {
        pub depth: usize,
        pub fanout: usize,
        /// One extra connection per this many nodes; `0` disables connections.
        pub connect_every: usize,
        pub text_len: usize,
    }

    impl TreeParams {
        pub const fn new(depth: usize, fanout: usize, connect_every: usize, text_len: usize) -> Self {
            Self { depth, fanout, connect_every, text_len }
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Case {
        Small,
        MediumDense,
        LargeLongText,
        RoutingStress,
    }

    impl Case {
        pub const fn id(self) -> &'static str {
            match self {
                Self::Small => "small",
                Self::MediumDense => "medium_dense",
                Self::LargeLongText => "large_long_text",
                Self::RoutingStress => "routing_stress",
            }
        }

        pub const fn params(self) -> TreeParams {
            match self {
                Self::Small => TreeParams::new(2, 3, 0, 8),
                Self::MediumDense => TreeParams::new(3, 4, 7, 12),
                Self::LargeLongText => TreeParams::new(4, 3, 0, 64),
                Self::RoutingStress => TreeParams::new(3, 4, 3, 10),
            }
        }
    }

    const DIRECTIONS: [Direction; 4] =
        [Direction::Bottom, Direction::Right, Direction::Left, Direction::Top];

    pub fn fixture(case: Case) -> Diagram {
        let params = case.params();
        let config = DiagramConfig { wrap_width: 16, ..DiagramConfig::default() };
        let mut diagram = Diagram::with_config("root", config).expect("valid bench config");

        let mut all = vec![diagram.root()];
        let mut level = vec![diagram.root()];
        for depth in 0..params.depth {
            let mut next = Vec::<NodeId>::new();
            for (parent_idx, parent) in level.iter().enumerate() {
                for child_idx in 0..params.fanout {
                    let direction = DIRECTIONS[(depth + parent_idx + child_idx) % DIRECTIONS.len()];
                    let text = ascii_repeat_to_len(
                        &format!("d{depth} n{parent_idx}.{child_idx} "),
                        'x',
                        params.text_len,
                    );
                    let child = diagram.add(*parent, direction, text, Default::default())
                        .expect("add child");
                    next.push(child);
                    all.push(child);
                }
            }
            level = next;
        }

        if params.connect_every > 0 {
            let stride = all.len() / 2 + 1;
            for (idx, source) in all.iter().enumerate().step_by(params.connect_every) {
                let target = all[(idx + stride) % all.len()];
                if *source == target {
                    continue;
                }
                diagram
                    .connect(*source, target, ConnectOptions::default())
                    .expect("connect");
            }
        }

        diagram
    }
}
