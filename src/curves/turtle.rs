//! Turtle-style drawing: heading-relative lines and arcs, and the
//! seven-fold rosette built on top of them.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::motion::{EPS, MotionError, SandPlate};

impl SandPlate {
    /// Move the ball `distance` units along the heading. An explicit
    /// direction becomes the new heading first.
    pub async fn forward(&self, distance: f64, direction_deg: Option<f64>) -> Result<(), MotionError> {
        let direction = match direction_deg {
            Some(direction) => {
                self.set_heading_deg(direction).await;
                direction
            }
            None => self.heading_deg().await,
        };
        let (x, y) = self.position().await;
        let (sin, cos) = direction.to_radians().sin_cos();
        self.line_to(x + cos * distance, y + sin * distance).await
    }

    /// Sweep an arc of `degrees` (strictly between 0 and 360) with the
    /// given radius, curving to the right or left of the heading; the
    /// heading turns by the swept angle.
    pub async fn turtle_arc(
        &self,
        radius: f64,
        degrees: f64,
        right_handed: bool,
        direction_deg: Option<f64>,
    ) -> Result<(), MotionError> {
        // Handedness flips on entry; all the geometry below reasons in
        // the flipped convention.
        let right_handed = !right_handed;

        if degrees <= 0.0 || degrees >= 360.0 {
            warn!(degrees, "arc sweep must be strictly between 0 and 360");
            return Ok(());
        }

        let direction = match direction_deg {
            Some(direction) => {
                self.set_heading_deg(direction).await;
                direction
            }
            None => self.heading_deg().await,
        };

        let (x1, y1) = self.position().await;
        let (sin, cos) = direction.to_radians().sin_cos();

        // Arc center sits perpendicular to the heading.
        let (center_x, center_y) = if right_handed {
            (x1 + sin * radius, y1 - cos * radius)
        } else {
            (x1 - sin * radius, y1 + cos * radius)
        };

        let end_angle = if right_handed {
            direction + 90.0 - degrees
        } else {
            direction - 90.0 + degrees
        };
        let x2 = center_x + radius * end_angle.to_radians().cos();
        let y2 = center_y + radius * end_angle.to_radians().sin();

        let minor = degrees <= 180.0;
        self.arc_to(x2, y2, radius + EPS, !right_handed, minor).await?;

        let heading = self.heading_deg().await;
        self.set_heading_deg(heading + if right_handed { -degrees } else { degrees })
            .await;
        Ok(())
    }

    /// Seven-fold arc rosette: three 120° lobes, each recursively split
    /// into seven √7-scaled sub-lobes with a fixed handedness sequence.
    pub async fn rosette(&self, levels: u32) -> Result<(), MotionError> {
        // A lobe radius of 151 fills a 400-unit plate; scale it with the
        // geometry.
        let lobe_radius = self.radius() * (151.0 / 400.0);

        self.goto_pos(lobe_radius, 0.0).await?;
        self.set_heading_deg(90.0).await;
        for _ in 0..3 {
            self.rosette_lobe(levels, lobe_radius, true).await?;
        }
        Ok(())
    }

    fn rosette_lobe<'a>(
        &'a self,
        level: u32,
        radius: f64,
        right_handed: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), MotionError>> + Send + 'a>> {
        Box::pin(async move {
            if level == 0 {
                return self.turtle_arc(radius, 120.0, right_handed, None).await;
            }

            // Heading correction so the seven sub-lobes tile the parent arc.
            let turn = -127.5 - (1.0 / (2.0 * 7.0_f64.sqrt())).asin().to_degrees();
            let heading = self.heading_deg().await;
            self.set_heading_deg(heading + turn).await;

            let sequence: [bool; 7] = if right_handed {
                [true, true, false, true, true, false, false]
            } else {
                [true, true, false, false, true, false, false]
            };
            for handed in sequence {
                self.rosette_lobe(level - 1, radius / 7.0_f64.sqrt(), handed)
                    .await?;
            }

            let heading = self.heading_deg().await;
            self.set_heading_deg(heading - turn).await;
            Ok(())
        })
    }
}
