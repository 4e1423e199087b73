//! Integration tests for raceway

use std::sync::Arc;

use serde_json::json;

use raceway::{Blueprint, NodeRegistry};

mod blueprint_tests {
    use super::*;

    #[tokio::test]
    async fn static_source_through_exposed_interface() {
        let blueprint = Blueprint::parse(
            r#"
pipeline:
  name: statics
  queues:
    rows:
      capacity: 16
  nodes:
    - kind: static_pusher
      name: seed
      params:
        data: [{"id": 1}, {"id": 2}]
      channels:
        target: rows
  expose:
    output: rows
"#,
        )
        .unwrap();

        let registry = NodeRegistry::with_builtin_nodes();
        let pipeline = Arc::new(registry.build(&blueprint).unwrap());

        let running = pipeline.start();
        let output = running.channel("output").unwrap();
        assert_eq!(
            output.items().collect().await.unwrap(),
            vec![json!({"id": 1}), json!({"id": 2})]
        );
        running.wait().await.unwrap();
    }

    #[tokio::test]
    async fn externally_driven_interface_channels() {
        use async_trait::async_trait;
        use raceway::{ConfigError, Node, NodeContext, NodeError, Payload, QueueNode};
        use snafu::ResultExt;

        /// Copies its source stream to its target, doubling numbers.
        struct Doubler {
            source: Arc<QueueNode<Payload>>,
            target: Arc<QueueNode<Payload>>,
        }

        impl Doubler {
            fn from_blueprint(
                context: &NodeContext<'_>,
            ) -> Result<Arc<dyn Node>, ConfigError> {
                Ok(Arc::new(Doubler {
                    source: context.channel("source")?,
                    target: context.channel("target")?,
                }))
            }
        }

        #[async_trait]
        impl Node for Doubler {
            async fn run(&self) -> Result<(), NodeError> {
                self.target
                    .produce(|target| async move {
                        let mut items = self.source.items();
                        while let Some(value) = items
                            .next()
                            .await
                            .context(raceway::error::QueueSnafu)?
                        {
                            let doubled = value.as_i64().map(|n| json!(n * 2)).unwrap_or(value);
                            target.put(doubled).await;
                        }
                        Ok(())
                    })
                    .await
            }

            fn name(&self) -> &str {
                "doubler"
            }
        }

        let blueprint = Blueprint::parse(
            r#"
pipeline:
  name: doubling
  queues:
    input: {}
    output: {}
  nodes:
    - kind: doubler
      channels:
        source: input
        target: output
  expose:
    input: input
    output: output
"#,
        )
        .unwrap();

        let mut registry = NodeRegistry::with_builtin_nodes();
        registry.register("doubler", Doubler::from_blueprint);

        let running = Arc::new(registry.build(&blueprint).unwrap()).start();

        let input = running.channel("input").unwrap();
        input
            .produce(|q| async move {
                for n in [1, 2, 3] {
                    q.put(json!(n)).await;
                }
                Ok::<_, NodeError>(())
            })
            .await
            .unwrap();

        let output = running.channel("output").unwrap();
        assert_eq!(
            output.items().collect().await.unwrap(),
            vec![json!(2), json!(4), json!(6)]
        );
        running.wait().await.unwrap();
    }
}

mod file_tests {
    use super::*;

    #[tokio::test]
    async fn jsonl_files_round_trip_through_a_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let in_one = dir.path().join("in_one.jsonl");
        let in_two = dir.path().join("in_two.jsonl");
        let out_one = dir.path().join("out_one.jsonl");
        let out_two = dir.path().join("out_two.jsonl");
        std::fs::write(&in_one, "{\"id\":1}\n{\"id\":2}\n").unwrap();
        std::fs::write(&in_two, "{\"id\":3}\n").unwrap();

        let yaml = format!(
            r#"
pipeline:
  name: copier
  queues:
    in_paths: {{}}
    out_paths: {{}}
    records: {{}}
  nodes:
    - kind: static_pusher
      name: in_seed
      params:
        data: ["{}", "{}"]
      channels:
        target: in_paths
    - kind: static_pusher
      name: out_seed
      params:
        data: ["{}", "{}"]
      channels:
        target: out_paths
    - kind: jsonl_reader
      channels:
        paths: in_paths
        target: records
    - kind: jsonl_writer
      channels:
        paths: out_paths
        source: records
"#,
            in_one.display(),
            in_two.display(),
            out_one.display(),
            out_two.display(),
        );

        let blueprint = Blueprint::parse(&yaml).unwrap();
        let registry = NodeRegistry::with_builtin_nodes();
        let pipeline = registry.build(&blueprint).unwrap();

        pipeline.run().await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&out_one).unwrap(),
            "{\"id\":1}\n{\"id\":2}\n"
        );
        assert_eq!(std::fs::read_to_string(&out_two).unwrap(), "{\"id\":3}\n");
    }
}
