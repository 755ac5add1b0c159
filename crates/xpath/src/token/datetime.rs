use super::{ArgumentSpec, TokenCore};
use crate::atomic::AtomicType;
use crate::collation::{CollationGuard, CollationRegistry, use_collation};
use crate::context::XPathContext;
use crate::error::{Error, ErrorCode};
use crate::sequence::Item;
use crate::temporal::MAX_TIMEZONE_SECONDS;
use crate::xdm::AtomicValue;
use chrono::{Duration, FixedOffset, NaiveDateTime, NaiveTime};

impl TokenCore {
    /// Adjusts the date, time or dateTime of the first argument to a timezone.
    ///
    /// With one argument the implicit timezone of the context is used. The
    /// second argument is a dayTimeDuration; an empty one removes the timezone.
    /// A value without timezone is given the new one unchanged, a value with one
    /// is moved to the same instant in the new timezone.
    pub fn adjust_datetime(
        &self,
        context: Option<&XPathContext>,
        target: AtomicType,
    ) -> Result<Option<AtomicValue>, Error> {
        let Some(Item::Atomic(value)) =
            self.get_argument(context, 0, &ArgumentSpec::new().with_target(target))?
        else {
            return Ok(None);
        };
        let timezone = if self.len() < 2 {
            context.and_then(|ctx| ctx.timezone)
        } else {
            let spec = ArgumentSpec::new().with_target(AtomicType::DayTimeDuration);
            match self.get_argument(context, 1, &spec)? {
                Some(Item::Atomic(AtomicValue::DayTimeDuration(secs))) => Some(self.timezone_from(secs)?),
                _ => None,
            }
        };
        self.shift_timezone(value, timezone).map(Some)
    }

    fn timezone_from(&self, secs: i64) -> Result<FixedOffset, Error> {
        if secs.abs() > MAX_TIMEZONE_SECONDS || secs % 60 != 0 {
            return Err(self.error(
                ErrorCode::FODT0003,
                Some(&format!("invalid timezone {}", AtomicValue::DayTimeDuration(secs))),
            ));
        }
        i32::try_from(secs)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| self.error(ErrorCode::FODT0003, None))
    }

    fn shift_timezone(
        &self,
        value: AtomicValue,
        timezone: Option<FixedOffset>,
    ) -> Result<AtomicValue, Error> {
        let overflow = || self.error(ErrorCode::FOAR0002, Some("date/time value out of range"));
        let shift = |local: NaiveDateTime, from: FixedOffset, to: FixedOffset| {
            let delta = i64::from(to.local_minus_utc() - from.local_minus_utc());
            local
                .checked_add_signed(Duration::seconds(delta))
                .ok_or_else(overflow)
        };
        Ok(match value {
            AtomicValue::DateTime { value, tz } => match (tz, timezone) {
                (Some(from), Some(to)) => AtomicValue::DateTime {
                    value: shift(value, from, to)?,
                    tz: Some(to),
                },
                (_, tz) => AtomicValue::DateTime { value, tz },
            },
            AtomicValue::Date { date, tz } => match (tz, timezone) {
                (Some(from), Some(to)) => AtomicValue::Date {
                    date: shift(date.and_time(NaiveTime::MIN), from, to)?.date(),
                    tz: Some(to),
                },
                (_, tz) => AtomicValue::Date { date, tz },
            },
            AtomicValue::Time { time, tz } => match (tz, timezone) {
                (Some(from), Some(to)) => {
                    let delta = i64::from(to.local_minus_utc() - from.local_minus_utc());
                    let (time, _) = time.overflowing_add_signed(Duration::seconds(delta));
                    AtomicValue::Time { time, tz: Some(to) }
                }
                (_, tz) => AtomicValue::Time { time, tz },
            },
            other => {
                return Err(self.wrong_context_type(Some(&format!(
                    "{} is not a date/time value",
                    other.type_name()
                ))));
            }
        })
    }

    /// Activates the collation `uri` until the returned guard is dropped.
    ///
    /// Collations are looked up in the registry of the context, or in the
    /// default registry without a context.
    pub fn use_locale(
        &self,
        context: Option<&XPathContext>,
        uri: &str,
    ) -> Result<CollationGuard, Error> {
        let result = match context {
            Some(ctx) => use_collation(&ctx.collations, uri),
            None => use_collation(&CollationRegistry::default(), uri),
        };
        result.map_err(|err| err.with_token(self.token_ref()))
    }
}
