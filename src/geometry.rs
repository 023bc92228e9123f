//! Geometric primitives for signature placement.

/// A rectangle in document space.
///
/// Used for signature widget placement. An empty rectangle (zero width or
/// height) marks the signature as invisible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of lower-left corner
    pub x: f32,
    /// Y coordinate of lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_signer::geometry::Rect;
    ///
    /// let rect = Rect::new(36.0, 700.0, 200.0, 50.0);
    /// assert_eq!(rect.width, 200.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// An empty rectangle at the origin.
    pub fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Check whether this rectangle encloses no area.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_signer::geometry::Rect;
    ///
    /// assert!(Rect::empty().is_empty());
    /// assert!(!Rect::new(0.0, 0.0, 10.0, 10.0).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_empty() {
        assert!(Rect::empty().is_empty());
        assert!(Rect::new(5.0, 5.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(5.0, 5.0, 10.0, 0.0).is_empty());
        assert!(!Rect::new(5.0, 5.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_default_is_empty() {
        assert!(Rect::default().is_empty());
    }
}
