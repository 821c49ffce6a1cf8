//! AWS backend
//!
//! Service adapters over the AWS SDK for Rust. All clients share one
//! `SdkConfig` built by [`AwsClients::connect`], which points at LocalStack
//! unless configured otherwise.
//!
//! SDK errors never leave this module: they are classified and turned into
//! [`QueueError`] or [`SinkError`] values carrying the rendered message.

pub mod client;
pub mod cloudwatch;
pub mod dynamodb;
pub mod s3;
pub mod sns;
pub mod sqs;

pub use client::AwsClients;
pub use cloudwatch::CloudWatchLogSink;
pub use dynamodb::DynamoTableStore;
pub use s3::S3BlobStore;
pub use sns::SnsNotifier;
pub use sqs::SqsQueue;

use crate::domain::{QueueError, SinkError};
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Coarse classification of a failed SDK call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Throttled,
    Connection,
    Timeout,
    NotFound,
    Rejected,
    Other,
}

/// Classifies an SDK error by failure mode and service error code
pub(crate) fn classify<E, R>(err: &SdkError<E, R>) -> ErrorKind
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::TimeoutError(_) => ErrorKind::Timeout,
        SdkError::DispatchFailure(failure) if failure.is_timeout() => ErrorKind::Timeout,
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => ErrorKind::Connection,
        SdkError::ConstructionFailure(_) => ErrorKind::Rejected,
        SdkError::ServiceError(context) => classify_code(context.err().code()),
        _ => ErrorKind::Other,
    }
}

/// Classifies a service error code
pub(crate) fn classify_code(code: Option<&str>) -> ErrorKind {
    let Some(code) = code else {
        return ErrorKind::Other;
    };

    if code.contains("Throttl")
        || code.contains("SlowDown")
        || code.contains("TooManyRequests")
        || code.contains("RequestLimitExceeded")
        || code.contains("ProvisionedThroughputExceeded")
    {
        ErrorKind::Throttled
    } else if code.contains("NotFound")
        || code.contains("NoSuch")
        || code.contains("NonExistent")
        || code.contains("DoesNotExist")
    {
        ErrorKind::NotFound
    } else if code.contains("InternalError")
        || code.contains("InternalFailure")
        || code.contains("InternalServerError")
        || code.contains("ServiceUnavailable")
    {
        ErrorKind::Connection
    } else if code.contains("AccessDenied")
        || code.contains("Validation")
        || code.contains("Invalid")
        || code.contains("Unrecognized")
        || code.contains("Authorization")
        || code.contains("Forbidden")
    {
        ErrorKind::Rejected
    } else {
        ErrorKind::Other
    }
}

/// Renders an error with its full source chain
pub(crate) fn describe<E>(err: &E) -> String
where
    E: std::error::Error,
{
    DisplayErrorContext(err).to_string()
}

/// Maps a failed sink call to a [`SinkError`]
pub(crate) fn sink_error<E, R>(sink: &str, err: SdkError<E, R>) -> SinkError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let sink = sink.to_string();
    let message = describe(&err);
    match classify(&err) {
        ErrorKind::Throttled => SinkError::Throttled { sink, message },
        ErrorKind::Connection => SinkError::ConnectionFailed { sink, message },
        ErrorKind::Timeout => SinkError::Timeout { sink, message },
        ErrorKind::NotFound => SinkError::ResourceNotFound { sink, message },
        ErrorKind::Rejected => SinkError::Rejected { sink, message },
        ErrorKind::Other => SinkError::WriteFailed { sink, message },
    }
}

/// Maps a failed queue call to a [`QueueError`]
///
/// Transient failures get their own variants; anything else is wrapped by
/// `otherwise`, which names the operation that failed.
pub(crate) fn queue_error<E, R>(err: SdkError<E, R>, otherwise: fn(String) -> QueueError) -> QueueError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let message = describe(&err);
    match classify(&err) {
        ErrorKind::Throttled => QueueError::Throttled(message),
        ErrorKind::Connection => QueueError::ConnectionFailed(message),
        ErrorKind::Timeout => QueueError::Timeout(message),
        ErrorKind::NotFound => QueueError::QueueNotFound(message),
        ErrorKind::Rejected | ErrorKind::Other => otherwise(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sqs::operation::send_message::SendMessageError;
    use test_case::test_case;

    #[test_case(Some("ThrottlingException"), ErrorKind::Throttled; "throttling")]
    #[test_case(Some("SlowDown"), ErrorKind::Throttled; "s3 slow down")]
    #[test_case(Some("ProvisionedThroughputExceededException"), ErrorKind::Throttled; "dynamodb throughput")]
    #[test_case(Some("NoSuchBucket"), ErrorKind::NotFound; "s3 bucket")]
    #[test_case(Some("ResourceNotFoundException"), ErrorKind::NotFound; "resource not found")]
    #[test_case(Some("AWS.SimpleQueueService.NonExistentQueue"), ErrorKind::NotFound; "sqs queue")]
    #[test_case(Some("InternalFailure"), ErrorKind::Connection; "internal failure")]
    #[test_case(Some("ServiceUnavailable"), ErrorKind::Connection; "unavailable")]
    #[test_case(Some("AccessDeniedException"), ErrorKind::Rejected; "access denied")]
    #[test_case(Some("ValidationException"), ErrorKind::Rejected; "validation")]
    #[test_case(Some("SomethingElse"), ErrorKind::Other; "unknown code")]
    #[test_case(None, ErrorKind::Other; "no code")]
    fn test_classify_code(code: Option<&str>, expected: ErrorKind) {
        assert_eq!(classify_code(code), expected);
    }

    #[test]
    fn test_classify_timeout() {
        let err: SdkError<SendMessageError, ()> = SdkError::timeout_error("took too long");
        assert_eq!(classify(&err), ErrorKind::Timeout);
    }

    #[test]
    fn test_classify_construction_failure() {
        let err: SdkError<SendMessageError, ()> = SdkError::construction_failure("bad input");
        assert_eq!(classify(&err), ErrorKind::Rejected);
    }

    #[test]
    fn test_sink_error_mapping_is_retryable_for_timeouts() {
        let err: SdkError<SendMessageError, ()> = SdkError::timeout_error("took too long");
        let mapped = sink_error("S3", err);
        assert!(matches!(mapped, SinkError::Timeout { .. }));
        assert!(mapped.is_retryable());
        assert_eq!(mapped.sink(), "S3");
    }

    #[test]
    fn test_queue_error_falls_back_to_operation_variant() {
        let err: SdkError<SendMessageError, ()> = SdkError::construction_failure("bad input");
        let mapped = queue_error(err, QueueError::SendFailed);
        assert!(matches!(mapped, QueueError::SendFailed(_)));
        assert!(!mapped.is_retryable());
    }
}
