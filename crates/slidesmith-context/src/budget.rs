// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget enforcement over a fragment set.
//!
//! Whole fragments are dropped in ascending priority order until the set
//! fits; if the fixed fragments still overflow, their bodies are truncated
//! tail-first, and past the elision floor they are shed outright. The user
//! instruction is exempt throughout, so the budget is guaranteed whenever
//! the user instruction alone fits.

use tracing::debug;

use crate::fragment::{ContextFragment, PRIORITY_SYNTAX_GUIDE, PRIORITY_USER_INSTRUCTION};

fn total_len(fragments: &[ContextFragment]) -> usize {
    fragments.iter().map(ContextFragment::rendered_len).sum()
}

/// Fits `fragments` into `budget_chars`, preserving their order.
///
/// Drop order is strictly ascending priority; among equal priorities the
/// later fragment is sacrificed first.
pub fn fit_to_budget(
    mut fragments: Vec<ContextFragment>,
    budget_chars: usize,
) -> Vec<ContextFragment> {
    // Pass 1: drop whole fragments, lowest priority first. The fixed
    // fragments (user instruction, system instructions, syntax guide) are
    // always included; they are only ever shrunk in pass 2.
    while total_len(&fragments) > budget_chars {
        let victim = fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| f.priority < PRIORITY_SYNTAX_GUIDE)
            .min_by_key(|(idx, f)| (f.priority, usize::MAX - idx))
            .map(|(idx, _)| idx);

        let Some(idx) = victim else { break };
        let dropped = fragments.remove(idx);
        debug!(
            priority = dropped.priority,
            label = dropped.label.as_str(),
            len = dropped.rendered_len(),
            "dropped fragment over budget"
        );
        if fragments.len() <= 1 {
            break;
        }
    }

    // Pass 2: the survivors are all load-bearing; shrink bodies instead.
    if total_len(&fragments) > budget_chars {
        let mut order: Vec<usize> = (0..fragments.len())
            .filter(|&i| fragments[i].priority < PRIORITY_USER_INSTRUCTION)
            .collect();
        order.sort_by_key(|&i| fragments[i].priority);

        for idx in order {
            let excess = total_len(&fragments).saturating_sub(budget_chars);
            if excess == 0 {
                break;
            }
            let current = fragments[idx].rendered_len();
            let target = current.saturating_sub(excess).max(fragments[idx].framing_len());
            fragments[idx].truncate_to(target);
        }
    }

    // Pass 3: a budget below even the elision-floored fixed fragments leaves
    // nothing to shrink; shed them whole, lowest priority first. Only the
    // user instruction is immune.
    while total_len(&fragments) > budget_chars {
        let victim = fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| f.priority < PRIORITY_USER_INSTRUCTION)
            .min_by_key(|(idx, f)| (f.priority, usize::MAX - idx))
            .map(|(idx, _)| idx);

        let Some(idx) = victim else { break };
        let dropped = fragments.remove(idx);
        debug!(
            priority = dropped.priority,
            label = dropped.label.as_str(),
            "shed fixed fragment, budget below its elision floor"
        );
    }

    fragments
}
