//! Type erasure for component call sites.
//!
//! A [`VComponent`](crate::nodes::VComponent) stores a component function
//! together with the props it was called with, but the tree that holds it
//! is homogeneous over `VNode`, so the pairing has to be boxed behind a
//! trait object. `VProps<P>` is the only implementor; `duplicate` lets a
//! `VComponent` be cloned (needed when a previous render's tree is kept
//! around for diffing) without knowing `P` at the call site.

use crate::error::CoreError;
use crate::instance::{HookOrderPanic, RenderTimeWritePanic, Scope, SsrMissingPanic};
use crate::nodes::Element;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// A render that panicked is reported through [`CoreError`] rather than
/// propagated, matching the "a component error must not corrupt siblings"
/// requirement; the component's last successful subtree (or a placeholder,
/// if it has none) is kept mounted.
pub(crate) enum RenderOutcome {
    Ready(Element),
    Panicked(CoreError),
}

pub(crate) trait AnyProps {
    fn render(&self, scope: &Scope) -> RenderOutcome;
    fn memoize(&self, other: &dyn Any) -> bool;
    fn props(&self) -> &dyn Any;
    fn duplicate(&self) -> Box<dyn AnyProps>;
    fn component_name(&self) -> &'static str;
    /// Address of the render function, used as the "same component type"
    /// identity check between renders.
    fn fn_ptr(&self) -> usize;
}

pub(crate) struct VProps<P> {
    pub render_fn: fn(P, &Scope) -> Element,
    pub memo: fn(&P, &P) -> bool,
    pub props: P,
    pub name: &'static str,
}

impl<P> VProps<P> {
    pub(crate) fn new(
        render_fn: fn(P, &Scope) -> Element,
        memo: fn(&P, &P) -> bool,
        props: P,
        name: &'static str,
    ) -> Self {
        Self {
            render_fn,
            memo,
            props,
            name,
        }
    }
}

impl<P: Clone + 'static> AnyProps for VProps<P> {
    fn memoize(&self, other: &dyn Any) -> bool {
        match other.downcast_ref::<Self>() {
            Some(other) => (self.memo)(&self.props, &other.props),
            None => false,
        }
    }

    fn props(&self) -> &dyn Any {
        &self.props
    }

    fn render(&self, scope: &Scope) -> RenderOutcome {
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            (self.render_fn)(self.props.clone(), scope)
        }));

        match result {
            Ok(element) => RenderOutcome::Ready(element),
            Err(payload) => {
                if let Some(HookOrderPanic(detail)) = payload.downcast_ref::<HookOrderPanic>() {
                    tracing::error!(component = self.name, %detail, "hook order violated");
                    return RenderOutcome::Panicked(CoreError::HookOrderViolation {
                        scope: scope.id(),
                        detail: detail.clone(),
                    });
                }
                if payload.downcast_ref::<RenderTimeWritePanic>().is_some() {
                    tracing::error!(component = self.name, "state write attempted during render");
                    return RenderOutcome::Panicked(CoreError::WriteDuringRender { scope: scope.id() });
                }
                if let Some(SsrMissingPanic(key)) = payload.downcast_ref::<SsrMissingPanic>() {
                    tracing::error!(component = self.name, %key, "resource has no synchronous value for SSR");
                    return RenderOutcome::Panicked(CoreError::SsrDataMissing { key: key.clone() });
                }

                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "component panicked".to_string());
                tracing::error!(component = self.name, %detail, "render panicked");
                RenderOutcome::Panicked(CoreError::ComponentPanicked {
                    scope: scope.id(),
                    detail,
                })
            }
        }
    }

    fn duplicate(&self) -> Box<dyn AnyProps> {
        Box::new(Self {
            render_fn: self.render_fn,
            memo: self.memo,
            props: self.props.clone(),
            name: self.name,
        })
    }

    fn component_name(&self) -> &'static str {
        self.name
    }

    fn fn_ptr(&self) -> usize {
        self.render_fn as usize
    }
}
