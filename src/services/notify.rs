use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

impl ToastLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            ToastLevel::Success => "toast-success",
            ToastLevel::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
}

/// Transient, non-blocking message channel used by the views.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: String);
}

/// Collects the toasts raised while a page is being produced.
#[derive(Default)]
pub struct ToastBuffer {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }
}

impl Notifier for ToastBuffer {
    fn notify(&self, level: ToastLevel, message: String) {
        self.toasts.lock().push(Toast {
            id: Uuid::new_v4(),
            level,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer_in_order() {
        let buffer = ToastBuffer::new();
        buffer.notify(ToastLevel::Success, "first".to_string());
        buffer.notify(ToastLevel::Error, "second".to_string());

        let toasts = buffer.drain();

        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "first");
        assert_eq!(toasts[1].level, ToastLevel::Error);
        assert_ne!(toasts[0].id, toasts[1].id);
        assert!(buffer.drain().is_empty());
    }
}
