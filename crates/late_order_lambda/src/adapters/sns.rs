use aws_sdk_sns::error::DisplayErrorContext;
use late_order_core::config::{require_setting, SNS_TOPIC_ARN_ENV};

use crate::adapters::notifier::LateOrderNotifier;

pub struct SnsTopicNotifier {
    pub topic_arn: Option<String>,
    pub client: aws_sdk_sns::Client,
}

impl LateOrderNotifier for SnsTopicNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<(), String> {
        let topic_arn = require_setting(self.topic_arn.as_deref(), SNS_TOPIC_ARN_ENV)?;
        let topic_arn = topic_arn.to_string();
        let client = self.client.clone();
        let subject = subject.to_string();
        let message = message.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .publish()
                    .topic_arn(topic_arn.clone())
                    .subject(subject)
                    .message(message)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to publish to {topic_arn}: {}",
                            DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}
