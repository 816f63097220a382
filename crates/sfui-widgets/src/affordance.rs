#![forbid(unsafe_code)]

//! Draggable, dismissible floating call-to-action.
//!
//! A [`FloatingAffordance`] is a small card pinned near a viewport corner.
//! The user can drag it anywhere inside the viewport (minus a margin),
//! click it to navigate to its target, or close it for good.
//!
//! # Visibility
//!
//! ```text
//! visible = authenticated ∧ role == required_role ∧ ¬dismissed
//! ```
//!
//! The auth part is recomputed on every change of the observed
//! [`AuthState`]. The dismissed part is read from the [`DismissalStore`] on
//! mount and on every auth change, and set locally when the close button is
//! activated. A role mismatch hides the card without writing the dismissal
//! key.
//!
//! # Click vs drag
//!
//! Pointer input goes through a [`DragGestureController`]. A release with a
//! [`Verdict::Click`] navigates; a [`Verdict::Drag`] does not. The browser's
//! synthetic click that follows every release is routed to
//! [`click`](FloatingAffordance::click), which only consumes the verdict. A
//! click with no preceding gesture (keyboard activation) navigates.
//!
//! # Close button
//!
//! The close button sits inside the card, so its press bubbles to the card's
//! own pointer handlers. Hosts route the close button's pointer-down to
//! [`close_button_pressed`](FloatingAffordance::close_button_pressed) before
//! anything else; until that press is released, the card starts no gesture
//! and its release never navigates. Activation then goes to
//! [`on_close_button_activated`](FloatingAffordance::on_close_button_activated).
//!
//! # Invariants
//!
//! 1. An invisible affordance ignores pointer input and never navigates.
//! 2. Losing visibility mid-drag cancels the drag on the next pointer event.
//! 3. Dropping the affordance releases its listener pair and its auth
//!    subscription.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sfui_core::{
    Anchor, DEFAULT_MARGIN, DragGestureController, EventResponse, GestureConfig, GestureOutput,
    ListenerRegistry, Point, PointerEvent, PointerEventKind, Size, Verdict,
};
use sfui_runtime::{AuthProvider, AuthState, NavigationIntent, Navigator, Role, Subscription};

use crate::dismissal::DismissalStore;

/// Size assumed for the card until the host measures it.
pub const DEFAULT_ELEMENT_SIZE: Size = Size::new(280.0, 56.0);

// ---------------------------------------------------------------------------
// AffordanceSpec
// ---------------------------------------------------------------------------

/// Static description of one floating affordance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffordanceSpec {
    /// Storage key of the dismissal flag.
    pub dismissal_key: String,
    /// Route opened on click.
    pub target: String,
    /// State handed to the target route.
    pub intent: NavigationIntent,
    /// Role a signed-in user must hold to see the card.
    pub required_role: Role,
    /// Offset from the anchor corner before any drag.
    pub initial_position: Point,
    /// Accessible name of the card.
    pub label: String,
    /// Accessible name of the close button.
    pub close_label: String,
    pub title: String,
    pub subtitle: String,
}

impl AffordanceSpec {
    /// "Book your next appointment" reminder for clients.
    #[must_use]
    pub fn appointment_reminder() -> Self {
        Self {
            dismissal_key: "hideAppointmentCTA".into(),
            target: "/client/appointments".into(),
            intent: NavigationIntent::open_modal(),
            required_role: Role::Client,
            initial_position: Point::new(DEFAULT_MARGIN, DEFAULT_MARGIN),
            label: "Reserva tu próxima cita".into(),
            close_label: "Cerrar recordatorio".into(),
            title: "Ya eres parte de la familia MediCitas".into(),
            subtitle: "Reserva tu próxima cita".into(),
        }
    }

    /// Shortcut from the clinic area into the pharmacy catalog.
    #[must_use]
    pub fn pharmacy_shortcut() -> Self {
        Self {
            dismissal_key: "hidePharmacyCartCTA".into(),
            target: "/pharmacy/catalog".into(),
            intent: NavigationIntent::none(),
            required_role: Role::Client,
            initial_position: Point::new(DEFAULT_MARGIN, DEFAULT_MARGIN),
            label: "Ir a farmacia".into(),
            close_label: "Cerrar acceso rápido a farmacia".into(),
            title: "Compra tus medicamentos".into(),
            subtitle: "Ir a farmacia MediCitas".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Collaborators shared by every affordance on a page.
#[derive(Clone)]
pub struct AffordanceContext {
    pub auth: AuthProvider,
    pub navigator: Rc<dyn Navigator>,
    pub dismissals: DismissalStore,
    pub listeners: ListenerRegistry,
}

impl fmt::Debug for AffordanceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AffordanceContext")
            .field("auth", &self.auth)
            .field("dismissals", &self.dismissals)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

/// What the host should draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffordanceFrame {
    pub visible: bool,
    /// Offset from `anchor`, already clamped.
    pub position: Point,
    pub anchor: Anchor,
    pub dragging: bool,
}

// ---------------------------------------------------------------------------
// FloatingAffordance
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct VisibilityFlags {
    authorized: Cell<bool>,
    dismissed: Cell<bool>,
}

impl VisibilityFlags {
    fn visible(&self) -> bool {
        self.authorized.get() && !self.dismissed.get()
    }
}

/// A mounted floating affordance.
pub struct FloatingAffordance {
    spec: AffordanceSpec,
    gesture: DragGestureController,
    element: Size,
    navigator: Rc<dyn Navigator>,
    dismissals: DismissalStore,
    flags: Rc<VisibilityFlags>,
    /// A press that started on the close button is still held.
    close_press: bool,
    _auth_subscription: Subscription,
}

impl fmt::Debug for FloatingAffordance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingAffordance")
            .field("key", &self.spec.dismissal_key)
            .field("visible", &self.flags.visible())
            .field("gesture", &self.gesture)
            .finish()
    }
}

impl FloatingAffordance {
    /// Mount an affordance: read the dismissal flag, observe auth.
    #[must_use]
    pub fn mount(spec: AffordanceSpec, config: GestureConfig, ctx: &AffordanceContext) -> Self {
        let flags = Rc::new(VisibilityFlags::default());
        refresh_visibility(&flags, &ctx.auth.get(), &spec, &ctx.dismissals);

        let subscription = {
            let flags = Rc::clone(&flags);
            let dismissals = ctx.dismissals.clone();
            let spec = spec.clone();
            ctx.auth.subscribe(move |state: &AuthState| {
                let was = flags.visible();
                refresh_visibility(&flags, state, &spec, &dismissals);
                let now = flags.visible();
                if was != now {
                    tracing::debug!(
                        target: "sfui.affordance",
                        key = %spec.dismissal_key,
                        visible = now,
                        "visibility changed"
                    );
                }
            })
        };

        let gesture = DragGestureController::new(
            config,
            spec.initial_position,
            ctx.listeners.clone(),
        );
        tracing::debug!(
            target: "sfui.affordance",
            key = %spec.dismissal_key,
            visible = flags.visible(),
            "affordance mounted"
        );

        Self {
            spec,
            gesture,
            element: DEFAULT_ELEMENT_SIZE,
            navigator: Rc::clone(&ctx.navigator),
            dismissals: ctx.dismissals.clone(),
            flags,
            close_press: false,
            _auth_subscription: subscription,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &AffordanceSpec {
        &self.spec
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.visible()
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.gesture.position()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    #[must_use]
    pub fn gesture(&self) -> &DragGestureController {
        &self.gesture
    }

    /// Record the measured size of the card.
    pub fn set_element_size(&mut self, element: Size) {
        self.element = element;
    }

    /// Frame for the current auth state. Re-clamps the position against
    /// `viewport` so a shrinking window never pushes the card off screen.
    pub fn render(&mut self, viewport: Size) -> AffordanceFrame {
        let position = self.gesture.clamp_to(self.element, viewport);
        AffordanceFrame {
            visible: self.flags.visible(),
            position,
            anchor: self.gesture.config().anchor,
            dragging: self.gesture.is_dragging(),
        }
    }

    /// Frame for an explicit auth snapshot. The affordance's own visibility
    /// and position are left as they are; a stored dismissal read here is
    /// remembered by the shared [`DismissalStore`] session.
    #[must_use]
    pub fn render_with(&self, auth: &AuthState, viewport: Size) -> AffordanceFrame {
        let visible = auth.has_role(&self.spec.required_role)
            && !self.flags.dismissed.get()
            && !self.dismissals.is_dismissed(&self.spec.dismissal_key);
        AffordanceFrame {
            visible,
            position: sfui_core::clamp_position(
                self.gesture.position(),
                self.element,
                viewport,
                self.gesture.config().margin,
            ),
            anchor: self.gesture.config().anchor,
            dragging: self.gesture.is_dragging(),
        }
    }

    /// Cancels a drag that outlived visibility. Returns `true` when pointer
    /// input may proceed.
    fn accepts_input(&mut self) -> bool {
        if self.flags.visible() {
            return true;
        }
        if self.gesture.pointer_cancel() {
            tracing::debug!(
                target: "sfui.affordance",
                key = %self.spec.dismissal_key,
                "drag cancelled: affordance hidden"
            );
        }
        false
    }

    pub fn pointer_down(&mut self, pointer: Point) -> EventResponse {
        if !self.accepts_input() || self.close_press {
            return EventResponse::NONE;
        }
        self.gesture.pointer_down(pointer)
    }

    pub fn pointer_move(&mut self, pointer: Point, viewport: Size) -> Option<Point> {
        if !self.accepts_input() {
            return None;
        }
        self.gesture.pointer_move(pointer, self.element, viewport)
    }

    /// Finish a gesture; a click verdict navigates.
    ///
    /// The release ending a close-button press only clears that press.
    pub fn pointer_up(&mut self) -> Option<Verdict> {
        if std::mem::take(&mut self.close_press) {
            return None;
        }
        if !self.accepts_input() {
            return None;
        }
        let verdict = self.gesture.pointer_up()?;
        self.on_release(verdict);
        Some(verdict)
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.close_press = false;
        self.gesture.pointer_cancel()
    }

    /// Feed one raw pointer event.
    pub fn process(&mut self, event: &PointerEvent, viewport: Size) -> GestureOutput {
        match event.kind {
            PointerEventKind::Down => GestureOutput::Pressed(self.pointer_down(event.pos)),
            PointerEventKind::Move => self
                .pointer_move(event.pos, viewport)
                .map_or(GestureOutput::Ignored, GestureOutput::Moved),
            PointerEventKind::Up => self
                .pointer_up()
                .map_or(GestureOutput::Ignored, GestureOutput::Released),
            PointerEventKind::Cancel => {
                if self.pointer_cancel() {
                    GestureOutput::Cancelled
                } else {
                    GestureOutput::Ignored
                }
            }
        }
    }

    /// Act on a gesture verdict.
    pub fn on_release(&self, verdict: Verdict) {
        match verdict {
            Verdict::Click if self.flags.visible() => self.navigate(),
            Verdict::Click => {}
            Verdict::Drag => {
                tracing::trace!(
                    target: "sfui.affordance",
                    key = %self.spec.dismissal_key,
                    "drag released; click suppressed"
                );
            }
        }
    }

    /// A `click` event on the card.
    ///
    /// Returns `true` if it navigated.
    pub fn click(&mut self) -> bool {
        if !self.flags.visible() {
            return false;
        }
        if self.gesture.take_verdict().is_some() {
            // Release already acted on this gesture.
            return false;
        }
        self.navigate();
        true
    }

    /// Pointer-down on the close button.
    ///
    /// Abandons any card gesture and holds off the card's press/release
    /// handling until the matching release reaches
    /// [`pointer_up`](Self::pointer_up).
    pub fn close_button_pressed(&mut self) -> EventResponse {
        if !self.accepts_input() {
            return EventResponse::NONE;
        }
        self.gesture.reset();
        self.close_press = true;
        EventResponse::STOP_PROPAGATION | EventResponse::PREVENT_DEFAULT
    }

    /// The close button was activated.
    ///
    /// The returned response always stops propagation so the card's own
    /// click handler never sees this activation. Together with
    /// [`close_button_pressed`](Self::close_button_pressed) no close
    /// interaction ever navigates.
    pub fn on_close_button_activated(&mut self) -> EventResponse {
        self.close_press = false;
        self.gesture.reset();
        self.flags.dismissed.set(true);
        self.dismissals.dismiss(&self.spec.dismissal_key);
        tracing::debug!(
            target: "sfui.affordance",
            key = %self.spec.dismissal_key,
            "affordance closed"
        );
        EventResponse::STOP_PROPAGATION
    }

    fn navigate(&self) {
        tracing::debug!(
            target: "sfui.affordance",
            key = %self.spec.dismissal_key,
            target_route = %self.spec.target,
            "affordance activated"
        );
        self.navigator
            .navigate(&self.spec.target, self.spec.intent.clone());
    }
}

fn refresh_visibility(
    flags: &VisibilityFlags,
    auth: &AuthState,
    spec: &AffordanceSpec,
    dismissals: &DismissalStore,
) {
    let authorized = auth.has_role(&spec.required_role);
    flags.authorized.set(authorized);
    if authorized && !flags.dismissed.get() && dismissals.is_dismissed(&spec.dismissal_key) {
        flags.dismissed.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfui_runtime::{MemoryNavigator, MemoryStorage, StorageBackend};

    const VIEWPORT: Size = Size::new(1024.0, 768.0);

    struct Harness {
        ctx: AffordanceContext,
        nav: Rc<MemoryNavigator>,
        storage: Rc<MemoryStorage>,
    }

    fn harness(auth: AuthState) -> Harness {
        let nav = Rc::new(MemoryNavigator::new("/client/home"));
        let storage = Rc::new(MemoryStorage::new());
        let ctx = AffordanceContext {
            auth: AuthProvider::new(auth),
            navigator: nav.clone(),
            dismissals: DismissalStore::new(storage.clone()),
            listeners: ListenerRegistry::new(),
        };
        Harness { ctx, nav, storage }
    }

    fn mount(h: &Harness) -> FloatingAffordance {
        FloatingAffordance::mount(
            AffordanceSpec::appointment_reminder(),
            GestureConfig::default(),
            &h.ctx,
        )
    }

    fn client() -> AuthState {
        AuthState::signed_in(Role::Client)
    }

    // --- Visibility ---

    #[test]
    fn visible_for_signed_in_client() {
        let h = harness(client());
        let aff = mount(&h);
        assert!(aff.is_visible());
    }

    #[test]
    fn hidden_for_guest_and_other_roles() {
        let h = harness(AuthState::anonymous());
        let aff = mount(&h);
        assert!(!aff.is_visible());

        h.ctx.auth.set(AuthState::signed_in(Role::Doctor));
        assert!(!aff.is_visible());
        assert!(h.storage.is_empty());
    }

    #[test]
    fn follows_auth_changes() {
        let h = harness(AuthState::anonymous());
        let aff = mount(&h);
        h.ctx.auth.set(client());
        assert!(aff.is_visible());
        h.ctx.auth.set(AuthState::anonymous());
        assert!(!aff.is_visible());
    }

    #[test]
    fn previously_dismissed_stays_hidden() {
        let h = harness(client());
        h.storage.set("hideAppointmentCTA", "true").unwrap();
        let aff = mount(&h);
        assert!(!aff.is_visible());
    }

    #[test]
    fn render_with_explicit_snapshot() {
        let h = harness(AuthState::anonymous());
        let aff = mount(&h);
        assert!(aff.render_with(&client(), VIEWPORT).visible);
        assert!(!aff.render_with(&AuthState::signed_in(Role::Admin), VIEWPORT).visible);
        // The cached view is untouched.
        assert!(!aff.is_visible());

        h.storage.set("hideAppointmentCTA", "true").unwrap();
        assert!(!aff.render_with(&client(), VIEWPORT).visible);
        // The stored flag now holds for the session even if storage forgets it.
        h.storage.clear();
        assert!(h.ctx.dismissals.is_dismissed("hideAppointmentCTA"));
    }

    // --- Click / drag ---

    #[test]
    fn click_gesture_navigates_once() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.pointer_down(Point::new(900.0, 700.0));
        aff.pointer_move(Point::new(901.0, 702.0), VIEWPORT);
        assert_eq!(aff.pointer_up(), Some(Verdict::Click));
        // Synthetic click after release.
        assert!(!aff.click());

        let history = h.nav.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].path, "/client/appointments");
        assert!(history[0].intent.open_modal);
    }

    #[test]
    fn drag_never_navigates() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.pointer_down(Point::new(900.0, 700.0));
        aff.pointer_move(Point::new(850.0, 650.0), VIEWPORT);
        assert_eq!(aff.pointer_up(), Some(Verdict::Drag));
        assert!(!aff.click());
        assert_eq!(h.nav.navigation_count(), 0);
        assert_eq!(aff.position(), Point::new(70.0, 70.0));
    }

    #[test]
    fn keyboard_activation_navigates() {
        let h = harness(client());
        let mut aff = mount(&h);
        assert!(aff.click());
        assert_eq!(h.nav.current_route(), "/client/appointments");
    }

    #[test]
    fn pharmacy_shortcut_has_no_intent() {
        let h = harness(client());
        let mut aff = FloatingAffordance::mount(
            AffordanceSpec::pharmacy_shortcut(),
            GestureConfig::default(),
            &h.ctx,
        );
        assert!(aff.click());
        let last = h.nav.last().unwrap();
        assert_eq!(last.path, "/pharmacy/catalog");
        assert!(last.intent.is_empty());
    }

    #[test]
    fn invisible_affordance_ignores_pointer() {
        let h = harness(AuthState::anonymous());
        let mut aff = mount(&h);
        assert_eq!(aff.pointer_down(Point::new(1.0, 1.0)), EventResponse::NONE);
        assert_eq!(aff.pointer_up(), None);
        assert!(!aff.click());
        assert_eq!(h.ctx.listeners.active(), 0);
        assert_eq!(h.nav.navigation_count(), 0);
    }

    #[test]
    fn logout_mid_drag_cancels_on_next_event() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.pointer_down(Point::new(500.0, 500.0));
        assert_eq!(h.ctx.listeners.active(), 1);

        h.ctx.auth.set(AuthState::anonymous());
        assert_eq!(aff.pointer_move(Point::new(400.0, 500.0), VIEWPORT), None);
        assert!(!aff.is_dragging());
        assert_eq!(h.ctx.listeners.active(), 0);
        assert_eq!(aff.pointer_up(), None);
    }

    // --- Close ---

    #[test]
    fn close_hides_persists_and_stops_propagation() {
        let h = harness(client());
        let mut aff = mount(&h);
        let resp = aff.on_close_button_activated();
        assert!(resp.stops_propagation());
        assert!(!aff.is_visible());
        assert_eq!(
            h.storage.get("hideAppointmentCTA").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(h.nav.navigation_count(), 0);
    }

    #[test]
    fn close_press_bubbling_to_card_never_navigates() {
        let h = harness(client());
        let mut aff = mount(&h);

        let resp = aff.close_button_pressed();
        assert!(resp.stops_propagation());
        assert!(resp.prevents_default());
        // The same press and its release bubble to the card.
        assert_eq!(aff.pointer_down(Point::new(1000.0, 740.0)), EventResponse::NONE);
        assert!(!aff.is_dragging());
        assert_eq!(h.ctx.listeners.active(), 0);
        assert_eq!(aff.pointer_up(), None);
        assert!(aff.on_close_button_activated().stops_propagation());

        assert_eq!(h.nav.navigation_count(), 0);
        assert!(!aff.is_visible());
    }

    #[test]
    fn close_press_abandons_card_drag() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.pointer_down(Point::new(900.0, 700.0));
        assert_eq!(h.ctx.listeners.active(), 1);

        aff.close_button_pressed();
        assert_eq!(h.ctx.listeners.active(), 0);
        assert_eq!(aff.pointer_up(), None);
        assert!(aff.is_visible());

        // Released away from the button: the next card press is a normal one.
        aff.pointer_down(Point::new(900.0, 700.0));
        assert_eq!(aff.pointer_up(), Some(Verdict::Click));
        assert_eq!(h.nav.navigation_count(), 1);
    }

    #[test]
    fn close_with_failing_storage_hides_for_session() {
        let h = harness(client());
        h.storage.fail_writes(true);
        let mut aff = mount(&h);
        aff.on_close_button_activated();
        assert!(!aff.is_visible());

        // Logging out and back in keeps it hidden in this session.
        h.ctx.auth.set(AuthState::anonymous());
        h.ctx.auth.set(client());
        assert!(!aff.is_visible());
    }

    #[test]
    fn each_affordance_uses_its_own_key() {
        let h = harness(client());
        let mut appt = mount(&h);
        let shop = FloatingAffordance::mount(
            AffordanceSpec::pharmacy_shortcut(),
            GestureConfig::default(),
            &h.ctx,
        );
        appt.on_close_button_activated();
        assert!(!appt.is_visible());
        assert!(shop.is_visible());
        assert_eq!(h.storage.get("hidePharmacyCartCTA").unwrap(), None);
    }

    // --- Rendering ---

    #[test]
    fn render_reclamps_after_resize() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.set_element_size(Size::new(240.0, 56.0));
        aff.pointer_down(Point::new(900.0, 700.0));
        aff.pointer_move(Point::new(300.0, 700.0), VIEWPORT);
        aff.pointer_up();

        let frame = aff.render(Size::new(400.0, 300.0));
        assert!(frame.visible);
        assert_eq!(frame.position, Point::new(140.0, 20.0));
        assert_eq!(frame.anchor, Anchor::BottomRight);
    }

    #[test]
    fn drop_releases_listeners_and_subscription() {
        let h = harness(client());
        let mut aff = mount(&h);
        aff.pointer_down(Point::new(1.0, 1.0));
        drop(aff);
        assert_eq!(h.ctx.listeners.active(), 0);
        h.ctx.auth.set(AuthState::anonymous());
        assert_eq!(h.ctx.auth.subscriber_count(), 0);
    }
}
