//! The exchange stage: spec.md §4.3.
//!
//! Pairs buffered inputs with idle outputs and swaps their buffers in
//! O(1), preserving any trailing partial-record bytes on the input side.

use crate::buffer::Buffer;
use crate::endpoint::{InputSet, OutputSet};

/// Runs one pass over all inputs, pairing each buffered one with an idle
/// output via the output set's round-robin cursor. Returns the number of
/// pairs actually exchanged this pass.
pub fn exchange(inputs: &mut InputSet, outputs: &mut OutputSet) -> usize {
    let mut exchanged = 0;
    for i in 0..inputs.len() {
        if inputs.num_buffered() == 0 {
            break;
        }
        if outputs.num_open() == 0 || outputs.num_busy() == outputs.num_open() {
            break;
        }
        if !inputs.get(i).is_buffered() {
            continue;
        }
        let Some(o) = outputs.find_idle_output() else {
            continue;
        };
        exchange_one(inputs, i, outputs, o);
        exchanged += 1;
    }
    exchanged
}

fn exchange_one(inputs: &mut InputSet, i: usize, outputs: &mut OutputSet, o: usize) {
    let input = inputs.get_mut(i);
    let output = outputs.get_mut(o);

    std::mem::swap(&mut input.buffer, &mut output.buffer);

    // `output.buffer` is now the formerly-full input buffer; `input.buffer`
    // is now the formerly-empty output buffer, which becomes the input's
    // fresh buffer after we pull any trailing partial-record bytes out of
    // the output side into it.
    input.buffer.reset();
    Buffer::move_trailing_data_after_last_record(&mut input.buffer, &mut output.buffer);

    tracing::debug!(
        input = %input.name,
        output = %output.name,
        bytes = output.buffer.size(),
        "exchanged buffer"
    );

    inputs.set_buffered(i, false);
    outputs.set_busy(o, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Input, Output};

    fn buffered_input(bytes: &[u8]) -> Input {
        let mut input = Input::new(-1, "in");
        let spare = input.buffer.spare_mut();
        spare[..bytes.len()].copy_from_slice(bytes);
        input.buffer.commit_write(bytes.len());
        input.buffer.scan_for_separator(0);
        input
    }

    #[test]
    fn exchange_moves_complete_records_and_preserves_tail() {
        let input = buffered_input(b"a\nb\npar");
        let mut inputs = InputSet::new(vec![input]);
        inputs.set_buffered(0, true);
        let mut outputs = OutputSet::new(vec![Output::new(-1, "out")]);

        let n = exchange(&mut inputs, &mut outputs);
        assert_eq!(n, 1);
        assert_eq!(outputs.get(0).buffer.occupied(), b"a\nb\n");
        assert!(outputs.get(0).is_busy());
        assert_eq!(inputs.get(0).buffer.occupied(), b"par");
        assert!(!inputs.get(0).is_buffered());
    }

    #[test]
    fn exchange_skips_when_all_outputs_busy() {
        let input = buffered_input(b"a\n");
        let mut inputs = InputSet::new(vec![input]);
        inputs.set_buffered(0, true);
        let mut outputs = OutputSet::new(vec![Output::new(-1, "out")]);
        outputs.set_busy(0, true);

        let n = exchange(&mut inputs, &mut outputs);
        assert_eq!(n, 0);
        assert!(inputs.get(0).is_buffered());
    }

    #[test]
    fn exchange_round_robins_across_two_outputs() {
        let a = buffered_input(b"a\n");
        let b = buffered_input(b"b\n");
        let mut inputs = InputSet::new(vec![a, b]);
        inputs.set_buffered(0, true);
        inputs.set_buffered(1, true);
        let mut outputs = OutputSet::new(vec![Output::new(-1, "o0"), Output::new(-1, "o1")]);

        let n = exchange(&mut inputs, &mut outputs);
        assert_eq!(n, 2);
        assert_eq!(outputs.get(0).buffer.occupied(), b"a\n");
        assert_eq!(outputs.get(1).buffer.occupied(), b"b\n");
    }
}
