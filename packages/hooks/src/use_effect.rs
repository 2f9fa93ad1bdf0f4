use weave_core::Scope;

struct EffectSlot<D> {
    deps: Option<D>,
    cleanup: Option<Box<dyn FnOnce()>>,
    unmount_registered: bool,
}

/// Runs `effect` once per distinct `deps` tuple (including the first time
/// this call site is reached), tearing down whatever the previous run
/// returned first. The teardown returned by the last run also fires when the
/// owning component unmounts, via [`Scope::on_cleanup`] - the one
/// deferred-teardown primitive `weave-core` exposes; there is no separate
/// "pending mount operation" queue for hook authors to reach into beyond it,
/// so `effect` itself runs inline rather than after commit.
pub fn use_effect<D, F>(scope: &Scope, deps: D, effect: F)
where
    D: PartialEq + Clone + 'static,
    F: FnOnce() -> Option<Box<dyn FnOnce()>>,
{
    let hook = scope.use_hook(|| EffectSlot::<D> {
        deps: None,
        cleanup: None,
        unmount_registered: false,
    });

    let changed = hook.with(|slot| slot.deps.as_ref() != Some(&deps));
    if changed {
        if let Some(cleanup) = hook.with_mut(|slot| slot.cleanup.take()) {
            cleanup();
        }
        let new_cleanup = effect();
        hook.with_mut(|slot| {
            slot.deps = Some(deps);
            slot.cleanup = new_cleanup;
        });
    }

    if hook.with(|slot| !slot.unmount_registered) {
        hook.with_mut(|slot| slot.unmount_registered = true);
        let hook_for_cleanup = hook.clone();
        scope.on_cleanup(move || {
            if let Some(cleanup) = hook_for_cleanup.with_mut(|slot| slot.cleanup.take()) {
                cleanup();
            }
        });
    }
}
