//! CloudWatch log groups.

use crate::error::Result;
use construct::{CfnResource, LogicalId, RemovalPolicy, Resource, Stack, Token};

/// Retention periods CloudWatch Logs accepts.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionDays {
    OneDay,
    ThreeDays,
    FiveDays,
    OneWeek,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
}

impl RetentionDays {
    /// Number of days, as written to `RetentionInDays`
    pub fn days(&self) -> u32 {
        match self {
            RetentionDays::OneDay => 1,
            RetentionDays::ThreeDays => 3,
            RetentionDays::FiveDays => 5,
            RetentionDays::OneWeek => 7,
            RetentionDays::TwoWeeks => 14,
            RetentionDays::OneMonth => 30,
            RetentionDays::ThreeMonths => 90,
            RetentionDays::SixMonths => 180,
            RetentionDays::OneYear => 365,
            RetentionDays::TwoYears => 731,
            RetentionDays::FiveYears => 1827,
            RetentionDays::TenYears => 3653,
        }
    }
}

/// A log group with a fixed name and retention.
#[derive(Debug, Clone)]
pub struct LogGroup {
    id: LogicalId,
}

impl LogGroup {
    /// Declare a log group at `scope`.
    ///
    /// The group is retained when it leaves the stack so that logs outlive
    /// the function that wrote them.
    pub fn new(stack: &mut Stack, scope: &[&str], name: Token, retention: RetentionDays) -> Result<Self> {
        let resource = CfnResource::new("AWS::Logs::LogGroup")
            .with("LogGroupName", name)
            .with("RetentionInDays", retention.days())
            .with_removal_policy(RemovalPolicy::Retain);
        let id = stack.add_resource(scope, resource)?;
        Ok(Self { id })
    }
}

impl Resource for LogGroup {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        "AWS::Logs::LogGroup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use construct::StackProps;

    #[test]
    fn test_log_group_retention() {
        let mut stack = Stack::new("Logs", StackProps::default()).unwrap();
        let group = LogGroup::new(
            &mut stack,
            &["Fn", "LogGroup", "Resource"],
            Token::from("/aws/lambda/fn"),
            RetentionDays::OneWeek,
        )
        .unwrap();

        let r = stack.resource(group.logical_id()).unwrap().render();
        assert_eq!(r["Properties"]["RetentionInDays"], 7);
        assert_eq!(r["Properties"]["LogGroupName"], "/aws/lambda/fn");
        assert_eq!(r["DeletionPolicy"], "Retain");
    }

    #[test]
    fn test_retention_values() {
        assert_eq!(RetentionDays::OneDay.days(), 1);
        assert_eq!(RetentionDays::OneMonth.days(), 30);
        assert_eq!(RetentionDays::TenYears.days(), 3653);
    }
}
