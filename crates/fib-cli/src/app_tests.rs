//! Tests for the run loop.

#[cfg(test)]
mod tests {
    use crate::app::{App, PROMPT};
    use crate::test_support::{SharedBuffer, exported, recording_provider};
    use fib_core::Error;
    use fib_trace::{FIBONACCI, POLL, RUN, SpanRecord, SpanStatus, WRITE};
    use opentelemetry::Context;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    /// Run the loop over `input` to completion.
    fn run(input: &str) -> (Error, String, Vec<SpanRecord>) {
        let (provider, spans) = recording_provider();
        let output = SharedBuffer::default();

        let mut app = App::new(input.as_bytes(), output.clone(), fib_trace::tracer(&provider));
        let err = app.run(&Context::new()).unwrap_err();

        (err, output.contents(), exported(&spans))
    }

    fn named<'a>(records: &'a [SpanRecord], name: &str) -> Vec<&'a SpanRecord> {
        records.iter().filter(|r| r.name == name).collect()
    }

    #[test]
    fn test_reports_result_then_fails_at_end_of_input() {
        let (err, output, _) = run("5\n");

        assert!(matches!(err, Error::EndOfInput));
        assert_eq!(
            output,
            format!("{PROMPT}\nfibonacci(5) = 5\n{PROMPT}\n")
        );
    }

    #[test]
    fn test_several_inputs() {
        let (_, output, _) = run("0\n1\n10\n93\n");

        let results: Vec<&str> = output.lines().filter(|l| *l != PROMPT).collect();
        assert_eq!(
            results,
            vec![
                "fibonacci(0) = 0",
                "fibonacci(1) = 1",
                "fibonacci(10) = 55",
                "fibonacci(93) = 12200160415121876738",
            ]
        );
    }

    #[test]
    fn test_overflow_is_reported_and_loop_continues() {
        let (err, output, records) = run("94\n3\n");

        assert!(matches!(err, Error::EndOfInput));
        assert!(output.contains("fibonacci(94) = unsigned integer overflow\n"));
        assert!(output.contains("fibonacci(3) = 2\n"));

        let fib = named(&records, FIBONACCI);
        assert_eq!(fib.len(), 2);
        assert_eq!(
            fib[0].status,
            SpanStatus::Error {
                description: "unsigned integer overflow".to_string()
            }
        );
        assert_eq!(fib[1].status, SpanStatus::Unset);
    }

    #[test]
    fn test_empty_input_fails_immediately() {
        let (err, output, records) = run("");

        assert!(matches!(err, Error::EndOfInput));
        assert!(err.is_input_failure());
        assert_eq!(output, format!("{PROMPT}\n"));

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![POLL, RUN]);
    }

    #[test]
    fn test_malformed_input_fails() {
        for input in ["abc\n", "-3\n", "\n", "1 2\n", "18446744073709551616\n"] {
            let (err, output, _) = run(input);
            assert!(
                matches!(err, Error::InvalidInput { .. }),
                "{input:?} gave {err:?}"
            );
            assert!(!output.contains("fibonacci("), "{input:?}");
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let (_, output, _) = run("  7 \r\n");
        assert!(output.contains("fibonacci(7) = 13\n"));
    }

    #[test]
    fn test_span_tree_per_iteration() {
        let (_, _, records) = run("5\n");

        // One full iteration, then a Run whose Poll hit end of input.
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![POLL, FIBONACCI, WRITE, RUN, POLL, RUN]);

        // Every span is exported once, so every span was ended once.
        let ids: HashSet<&str> = records.iter().map(|r| r.span_id.as_str()).collect();
        assert_eq!(ids.len(), records.len());

        let runs = named(&records, RUN);
        let polls = named(&records, POLL);
        let write = named(&records, WRITE)[0];
        let fib = named(&records, FIBONACCI)[0];

        for run in &runs {
            assert!(run.parent_span_id.is_none());
        }
        assert_ne!(runs[0].trace_id, runs[1].trace_id);

        assert_eq!(polls[0].parent_span_id.as_deref(), Some(runs[0].span_id.as_str()));
        assert_eq!(polls[1].parent_span_id.as_deref(), Some(runs[1].span_id.as_str()));
        assert_eq!(write.parent_span_id.as_deref(), Some(runs[0].span_id.as_str()));
        assert_eq!(fib.parent_span_id.as_deref(), Some(write.span_id.as_str()));
    }

    #[test]
    fn test_poll_span_attributes_and_failure() {
        let (_, _, records) = run("18446744073709551615\n");

        let polls = named(&records, POLL);
        assert_eq!(
            polls[0].attributes.get("request.n").map(String::as_str),
            Some("18446744073709551615")
        );
        assert_eq!(polls[0].status, SpanStatus::Unset);

        assert!(!polls[1].attributes.contains_key("request.n"));
        assert_eq!(
            polls[1].status,
            SpanStatus::Error {
                description: "unexpected end of input".to_string()
            }
        );
        assert_eq!(polls[1].events, vec!["exception".to_string()]);
    }
}
