use super::*;
use crate::render::painter::Painter;
use crate::effects::transitions::LayerPose;

fn item(caption: Option<&str>, author: Option<&str>) -> MediaItem {
    MediaItem {
        caption: caption.map(str::to_owned),
        author: author.map(str::to_owned),
        ..MediaItem::photo("1", "a.png")
    }
}

#[test]
fn bubble_wins_when_comic_styling_and_caption_are_present() {
    let opts = RenderOptions {
        comic_captions: true,
        ..RenderOptions::default()
    };
    let it = item(Some("Cheers!"), Some("Ana"));
    assert_eq!(
        Caption::for_item(&it, &opts),
        Some(Caption::Bubble { text: "Cheers!" })
    );
}

#[test]
fn legend_falls_back_to_the_event_title() {
    let opts = RenderOptions {
        comic_captions: true,
        title_text: Some("Summer Party".into()),
        ..RenderOptions::default()
    };
    let it = item(Some("   "), Some("Ana"));
    assert_eq!(
        Caption::for_item(&it, &opts),
        Some(Caption::Legend {
            title: "Summer Party",
            author: Some("Ana"),
        })
    );
}

#[test]
fn no_caption_without_text_or_when_disabled() {
    let opts = RenderOptions::default();
    assert_eq!(Caption::for_item(&item(None, Some("Ana")), &opts), None);

    let off = RenderOptions {
        title_overlay: false,
        title_text: Some("Party".into()),
        ..RenderOptions::default()
    };
    assert_eq!(Caption::for_item(&item(Some("Hi"), None), &off), None);
}

#[test]
fn captions_fade_in_over_the_first_tenth() {
    assert_eq!(caption_opacity(0.0), 0.0);
    assert!(caption_opacity(0.05) > 0.0 && caption_opacity(0.05) < 1.0);
    assert_eq!(caption_opacity(0.1), 1.0);
    assert_eq!(caption_opacity(0.8), 1.0);
}

#[test]
fn text_overlays_draw_ink_when_a_font_exists() {
    let Some(engine) = TextEngine::discover(None) else {
        return;
    };
    let canvas = Canvas {
        width: 320,
        height: 180,
    };
    let mut painter = Painter::new(canvas, [0, 0, 0, 255], Some(engine)).unwrap();
    let base = DecodedImage::solid(320, 180, [0, 0, 0, 255]).unwrap();
    let plain = painter
        .compose(&[(&base, LayerPose::identity())], None)
        .unwrap();

    for caption in [
        Caption::Legend {
            title: "Dance floor",
            author: Some("Ana"),
        },
        Caption::Bubble { text: "What a night!" },
    ] {
        let with_text = painter
            .compose(&[(&base, LayerPose::identity())], Some((caption, 1.0)))
            .unwrap();
        assert_ne!(with_text.data, plain.data, "{caption:?}");
    }
}
