//! booker assertion macros.
//!
//! Those assertions are borrowed from `pretty_assertions` crate and made
//! with small modification which returns `Result<_, Error>` instead of
//! panicking, so a failed check ends the scenario with a report carrying
//! both the expected and the actual value.

/// Error raised by the assertion macros. Scenarios propagate it with `?`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Check(String),
    #[error("{0}")]
    StrEq(String),
    #[error("{0}")]
    Eq(String),
    #[error("{0}")]
    Ne(String),
}

/// Asserts that a boolean expression is true.
///
/// ```rust,ignore
/// use booker::{check, eyre};
///
/// async fn ping(client: &booker::ApiClient) -> eyre::Result<()> {
///     let status = client.health_check().await?;
///     check!(status.is_success(), "ping answered {status}");
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        $crate::check!(@ $cond, "", "");
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::check!(@ $cond, ": ", $($arg)+);
    };
    (@ $cond:expr, $maybe_colon:expr, $($arg:tt)*) => {
        if !$cond {
            let __message = format!("check failed: {}{}{}", stringify!($cond), $maybe_colon, format_args!($($arg)*));
            Err($crate::assertion::Error::Check(__message))?;
        }
    };
}

/// Asserts that two string expressions are equal, showing a line diff on failure.
#[macro_export]
macro_rules! check_str_eq {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::check_str_eq!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)*) => ({
        $crate::check_str_eq!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    let __message = format!("check failed: `(left == right)`{}{}\
                       \n\
                       \n{}\
                       \n",
                       $maybe_colon,
                       format_args!($($arg)*),
                       $crate::pretty_assertions::StrComparison::new(left_val, right_val)
                    );
                    Err($crate::assertion::Error::StrEq(__message))?;
                }
            }
        }
    });
}

/// Asserts that two expressions are equal using `==`.
///
/// The left side is the expected value, the right side the actual one:
///
/// ```rust,ignore
/// let created = client.create_booking(&payload, None).await?;
/// check_eq!("Ivan", created["booking"]["firstname"], "firstname is echoed");
/// ```
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::check_eq!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)*) => ({
        $crate::check_eq!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    let __message = format!("check failed: `(expected == actual)`{}{}\
                       \n\
                       \n{}\
                       \n",
                       $maybe_colon,
                       format_args!($($arg)*),
                       $crate::pretty_assertions::Comparison::new(left_val, right_val)
                    );
                    Err($crate::assertion::Error::Eq(__message))?;
                }
            }
        }
    });
}

/// Asserts that two expressions are not equal using `!=`.
#[macro_export]
macro_rules! check_ne {
    ($left:expr, $right:expr$(,)?) => ({
        $crate::check_ne!(@ $left, $right, "", "");
    });
    ($left:expr, $right:expr, $($arg:tt)+) => ({
        $crate::check_ne!(@ $left, $right, ": ", $($arg)+);
    });
    (@ $left:expr, $right:expr, $maybe_colon:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if *left_val == *right_val {
                    let __message = format!("check failed: `(left != right)`{}{}\
                        \n\
                        \nBoth sides:\
                        \n{:#?}\
                        \n\
                        \n",
                        $maybe_colon,
                        format_args!($($arg)*),
                        left_val
                    );
                    Err($crate::assertion::Error::Ne(__message))?;
                }
            }
        }
    });
}
