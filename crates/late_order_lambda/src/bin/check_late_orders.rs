use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use late_order_core::config::MonitorConfig;
use late_order_lambda::adapters::dynamodb::DynamoDbOrderIndex;
use late_order_lambda::adapters::sns::SnsTopicNotifier;
use late_order_lambda::handlers::monitor::{detect_and_notify, MonitorOutcome};
use late_order_lambda::logging::init_logging;
use serde_json::Value;

struct AwsClients {
    dynamodb: aws_sdk_dynamodb::Client,
    sns: aws_sdk_sns::Client,
}

async fn handle_request(
    clients: &AwsClients,
    event: LambdaEvent<Value>,
) -> Result<MonitorOutcome, Error> {
    let config = MonitorConfig::from_env()?;

    let trigger = ScheduledTrigger::from_event(&event.payload);
    tracing::info!(
        component = "late_order_monitor",
        event = "invocation_started",
        request_id = %event.context.request_id,
        trigger_id = trigger.id.unwrap_or("-"),
        trigger_time = trigger.time.unwrap_or("-"),
        threshold_millis = config.threshold.millis(),
        "checking for late orders"
    );

    let index = DynamoDbOrderIndex {
        table_name: config.table_name,
        client: clients.dynamodb.clone(),
    };
    let notifier = SnsTopicNotifier {
        topic_arn: config.topic_arn,
        client: clients.sns.clone(),
    };

    Ok(detect_and_notify(
        config.threshold,
        Utc::now().timestamp_millis(),
        &index,
        &notifier,
    ))
}

/// Correlation fields of an EventBridge scheduled event, when present.
#[derive(Debug, Default, PartialEq, Eq)]
struct ScheduledTrigger<'a> {
    id: Option<&'a str>,
    time: Option<&'a str>,
}

impl<'a> ScheduledTrigger<'a> {
    fn from_event(event: &'a Value) -> Self {
        Self {
            id: event.get("id").and_then(Value::as_str),
            time: event.get("time").and_then(Value::as_str),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging().map_err(|error| Error::from(format!("failed to init logging: {error}")))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let clients = AwsClients {
        dynamodb: aws_sdk_dynamodb::Client::new(&aws_config),
        sns: aws_sdk_sns::Client::new(&aws_config),
    };
    let clients = &clients;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(clients, event).await
    }))
    .await
}
