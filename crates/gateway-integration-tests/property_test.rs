//! Property-based coverage for the codec's panic-freedom (property 9) and
//! the docker argv rewrite's determinism (property 4).

use gateway_config::{DockerConfig, RiskLevel, ServerConfig};
use gateway_runtime::codec::LineFramer;
use gateway_runtime::risk::plan_spawn;
use proptest::prelude::*;

proptest! {
    /// Property 9: arbitrary bytes fed to the line framer never panic, and
    /// feeding the same bytes again after a `feed` never re-yields a frame
    /// already produced — forward progress holds across chunk boundaries.
    #[test]
    fn line_framer_never_panics_on_arbitrary_bytes(chunks in proptest::collection::vec(any::<Vec<u8>>(), 0..8)) {
        let mut framer = LineFramer::new();
        let mut total_frames = 0;
        for chunk in &chunks {
            let (frames, malformed) = framer.feed(chunk);
            total_frames += frames.len() + malformed.len();
        }
        prop_assert!(total_frames <= chunks.iter().map(|c| c.len() + 1).sum());
    }

    /// Property 9 (specialized): well-formed JSON-RPC lines interleaved with
    /// garbage lines always yield exactly the well-formed ones as frames,
    /// regardless of how the byte stream is chunked.
    #[test]
    fn well_formed_lines_always_survive_arbitrary_chunking(
        split_at in 0usize..200,
    ) {
        let body = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\nnot json\n{\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{}}\n";
        let split_at = split_at.min(body.len());
        let (first, second) = body.split_at(split_at);

        let mut framer = LineFramer::new();
        let (mut frames, mut malformed) = framer.feed(first);
        let (more_frames, more_malformed) = framer.feed(second);
        frames.extend(more_frames);
        malformed.extend(more_malformed);

        prop_assert_eq!(frames.len(), 2);
        prop_assert_eq!(malformed.len(), 1);
    }

    /// Property 4: for any risk-agnostic `ServerConfig`, a HIGH-risk spawn
    /// plan's argv always starts with `run`, `--rm`, contains the image
    /// exactly once, and carries one `-e` flag per configured env var.
    #[test]
    fn docker_rewrite_is_deterministic_for_arbitrary_configs(
        command in "[a-z]{1,12}",
        args in proptest::collection::vec("[a-zA-Z0-9_./-]{1,16}", 0..5),
        env_keys in proptest::collection::vec("[A-Z][A-Z0-9_]{0,8}", 0..5),
        image in "[a-z0-9][a-z0-9:._-]{1,20}",
    ) {
        let env: Vec<(String, String)> = env_keys
            .into_iter()
            .enumerate()
            .map(|(i, k)| (k, format!("v{}", i)))
            .collect();

        let config = ServerConfig {
            command,
            args,
            env: env.clone(),
            risk_level: Some(RiskLevel::High),
            docker: Some(DockerConfig {
                image: image.clone(),
                volumes: vec![],
                network: None,
            }),
        };

        let plan = plan_spawn(&config);
        prop_assert_eq!(&plan.command, "docker");
        prop_assert_eq!(&plan.args[0], "run");
        prop_assert_eq!(&plan.args[1], "--rm");
        prop_assert_eq!(plan.args.iter().filter(|a| *a == &image).count(), 1);

        let e_flag_count = plan.args.iter().filter(|a| a.as_str() == "-e").count();
        prop_assert_eq!(e_flag_count, env.len());
    }
}
