//! Typed step handlers and their type-erased form.
//!
//! A step handler is any `Fn(&mut dyn HostRunner, &mut Context, A1, .., An)`
//! closure or function whose trailing parameters implement [`FromCapture`]. The
//! [`StepHandler`] trait is implemented for such functions of up to six
//! trailing parameters; [`Handler`] erases the concrete type so definitions
//! with different signatures can share one registry.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use stepwise_harness::HostRunner;
use thiserror::Error;

use crate::coercion::{ArgKind, CoercionError, CoercionMode, FromCapture, coerce};
use crate::context::Context;

/// Errors produced while invoking a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvokeError {
    /// The number of captured values differs from the handler's parameters.
    #[error("the step function expects {expected} argument(s) but the pattern captured {actual}")]
    ArityMismatch {
        /// Declared parameter count after the runner and context.
        expected: usize,
        /// Number of captured groups.
        actual: usize,
    },
    /// A captured value could not be converted.
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    /// The handler returned an error.
    #[error("{0}")]
    Failed(String),
}

/// Return types accepted from step handlers.
pub trait StepOutput {
    /// Convert into a pass/fail outcome.
    ///
    /// # Errors
    /// Returns the failure message when the step failed.
    fn into_outcome(self) -> Result<(), String>;
}

impl StepOutput for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> StepOutput for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|err| err.to_string())
    }
}

impl StepOutput for Infallible {
    fn into_outcome(self) -> Result<(), String> {
        match self {}
    }
}

/// Exposes the return type of a function pointer.
///
/// Used to name the type of handler bodies that always diverge, such as
/// closures ending in [`RunnerExt::fatal`](stepwise_harness::RunnerExt::fatal)
/// or `panic!`.
#[doc(hidden)]
pub trait ReturnType {
    /// The function's return type.
    type Output;
}

impl<R> ReturnType for fn() -> R {
    type Output = R;
}

type Never = <fn() -> ! as ReturnType>::Output;

impl StepOutput for Never {
    fn into_outcome(self) -> Result<(), String> {
        match self {}
    }
}

/// Functions usable as step handlers.
///
/// `Args` is the tuple of trailing parameter types and only serves to keep
/// the implementations for different arities apart.
pub trait StepHandler<Args>: Send + Sync + 'static {
    /// Kinds of the trailing parameters, in order.
    fn kinds(&self) -> Vec<ArgKind>;

    /// Coerce `args` and call the handler.
    ///
    /// # Errors
    /// See [`InvokeError`].
    fn invoke(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        args: &[&str],
        mode: CoercionMode,
    ) -> Result<(), InvokeError>;
}

macro_rules! impl_step_handler {
    () => {
        impl<Func, Out> StepHandler<()> for Func
        where
            Func: Fn(&mut dyn HostRunner, &mut Context) -> Out + Send + Sync + 'static,
            Out: StepOutput,
        {
            fn kinds(&self) -> Vec<ArgKind> {
                Vec::new()
            }

            fn invoke(
                &self,
                runner: &mut dyn HostRunner,
                ctx: &mut Context,
                args: &[&str],
                _mode: CoercionMode,
            ) -> Result<(), InvokeError> {
                if !args.is_empty() {
                    return Err(InvokeError::ArityMismatch {
                        expected: 0,
                        actual: args.len(),
                    });
                }
                (self)(runner, ctx).into_outcome().map_err(InvokeError::Failed)
            }
        }
    };
    ($($ty:ident $var:ident),+) => {
        impl<Func, Out, $($ty,)*> StepHandler<($($ty,)*)> for Func
        where
            Func: Fn(&mut dyn HostRunner, &mut Context, $($ty),*) -> Out + Send + Sync + 'static,
            Out: StepOutput,
            $($ty: FromCapture,)*
        {
            fn kinds(&self) -> Vec<ArgKind> {
                vec![$($ty::KIND),*]
            }

            fn invoke(
                &self,
                runner: &mut dyn HostRunner,
                ctx: &mut Context,
                args: &[&str],
                mode: CoercionMode,
            ) -> Result<(), InvokeError> {
                let [$($var),*] = args else {
                    return Err(InvokeError::ArityMismatch {
                        expected: self.kinds().len(),
                        actual: args.len(),
                    });
                };
                $(let $var = coerce::<$ty>($var, mode)?;)*
                (self)(runner, ctx, $($var),*)
                    .into_outcome()
                    .map_err(InvokeError::Failed)
            }
        }
    };
}

impl_step_handler!();
impl_step_handler!(A1 a1);
impl_step_handler!(A1 a1, A2 a2);
impl_step_handler!(A1 a1, A2 a2, A3 a3);
impl_step_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_step_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_step_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

trait ErasedHandler: Send + Sync {
    fn kinds(&self) -> Vec<ArgKind>;
    fn invoke(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        args: &[&str],
        mode: CoercionMode,
    ) -> Result<(), InvokeError>;
}

struct Erased<F, Args> {
    func: F,
    kinds: Vec<ArgKind>,
    _args: std::marker::PhantomData<fn() -> Args>,
}

impl<F, Args> ErasedHandler for Erased<F, Args>
where
    F: StepHandler<Args>,
{
    fn kinds(&self) -> Vec<ArgKind> {
        self.kinds.clone()
    }

    fn invoke(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        args: &[&str],
        mode: CoercionMode,
    ) -> Result<(), InvokeError> {
        self.func.invoke(runner, ctx, args, mode)
    }
}

/// A shared, type-erased step handler.
///
/// # Examples
/// ```
/// use stepwise::{Context, Handler};
/// use stepwise::coercion::{ArgKind, CoercionMode};
/// use stepwise_harness::{HostRunner, StdRunner};
///
/// let handler = Handler::new(|_: &mut dyn HostRunner, ctx: &mut Context, cats: u32| {
///     ctx.set("cats", cats);
/// });
/// assert_eq!(handler.arity(), 1);
/// assert_eq!(handler.kinds(), vec![ArgKind::Integer]);
///
/// let mut runner = StdRunner::new("step");
/// let mut ctx = Context::new();
/// handler.invoke(&mut runner, &mut ctx, &["3"], CoercionMode::Strict).expect("handler runs");
/// assert_eq!(ctx.get::<_, u32>(&"cats"), Some(&3));
/// ```
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn ErasedHandler>,
}

impl Handler {
    /// Wrap a typed handler.
    #[must_use]
    pub fn new<F, Args>(func: F) -> Self
    where
        F: StepHandler<Args>,
        Args: 'static,
    {
        let kinds = func.kinds();
        Self {
            inner: Arc::new(Erased {
                func,
                kinds,
                _args: std::marker::PhantomData,
            }),
        }
    }

    /// Number of trailing parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inner.kinds().len()
    }

    /// Kinds of the trailing parameters.
    #[must_use]
    pub fn kinds(&self) -> Vec<ArgKind> {
        self.inner.kinds()
    }

    /// Coerce `args` and call the handler.
    ///
    /// # Errors
    /// See [`InvokeError`].
    pub fn invoke(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        args: &[&str],
        mode: CoercionMode,
    ) -> Result<(), InvokeError> {
        self.inner.invoke(runner, ctx, args, mode)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("kinds", &self.inner.kinds())
            .finish()
    }
}
